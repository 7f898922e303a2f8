use freightquote_core::QuoteResult;
use ratatui::{
    prelude::*,
    widgets::{
        Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap,
    },
};

use crate::app::{App, Field, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new(format!(
        "freightquote · compare freight quotes across {} carrier services",
        app.carriers.len()
    ))
    .block(Block::default().borders(Borders::ALL).title("Freightquote"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::RequestForm => draw_request_form(frame, app, *content_area),
        Screen::QuoteList => draw_quote_list(frame, app, *content_area),
        Screen::QuoteDetail => draw_quote_detail(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::RequestForm => {
            "↑/↓ field · type to edit · Space toggle · Ctrl-N add item · Ctrl-X clear items · Enter quote · Ctrl-C quit"
        }
        Screen::QuoteList => "↑/↓ move · Enter/→ breakdown · Esc/←/b edit request · q/Ctrl-C quit",
        Screen::QuoteDetail => "↑/↓ other carrier · Esc/←/b back to quotes · q/Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Quoting… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_request_form(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [form_area, items_area] = chunks else {
        return;
    };

    let items = Field::ALL
        .iter()
        .map(|field| {
            let value = app.form.display_value(*field);
            let marker = if field.is_toggle() { "◂▸" } else { "  " };
            ListItem::new(format!("{:<20} {marker} {value}", field.label()))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Shipment (Enter to quote)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(app.field_index));
    frame.render_stateful_widget(list, *form_area, &mut state);

    let lines = if app.form.items.is_empty() {
        vec![ListItem::new(
            "No items added. The weight and size fields are quoted as one item.",
        )]
    } else {
        app.form
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                ListItem::new(format!(
                    "{}. {} kg · {}×{}×{} cm",
                    idx + 1,
                    item.weight_kg(),
                    item.length_cm(),
                    item.breadth_cm(),
                    item.height_cm()
                ))
            })
            .collect()
    };

    let item_list = List::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Items ({})", app.form.items.len())),
    );
    frame.render_widget(item_list, *items_area);
}

fn draw_quote_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = app.quoted_at.map_or_else(
        || "Quotes".to_owned(),
        |quoted_at| format!("Quotes at {}", quoted_at.format("%H:%M:%S")),
    );

    if app.results.is_empty() {
        let paragraph = Paragraph::new("No quotes yet. Fill in the request and press Enter.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = app.results.iter().map(|quote| {
        let style = if quote.deliverable {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let total = if quote.deliverable {
            money(quote.total_after_tax)
        } else {
            "-".to_owned()
        };
        Row::new(vec![
            Cell::from(quote.carrier_name.clone()),
            Cell::from(zone_label(quote)),
            Cell::from(format!("{:.2} kg", quote.chargeable_weight_kg)),
            Cell::from(money(quote.base_freight)),
            Cell::from(money(quote.surcharges.total())),
            Cell::from(money(quote.tax_amount)),
            Cell::from(total),
            Cell::from(quote.reason.clone().unwrap_or_default()),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(24),
        Constraint::Length(24),
        Constraint::Length(11),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(11),
        Constraint::Length(13),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec![
                "Carrier",
                "Zones",
                "Weight",
                "Base",
                "Surcharges",
                "GST",
                "Total",
                "Note",
            ])
            .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .column_spacing(1);

    let mut state = TableState::default();
    state.select(Some(app.result_index));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_quote_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(quote) = app.selected_result() else {
        let paragraph = Paragraph::new("No quote selected.")
            .block(Block::default().borders(Borders::ALL).title("Breakdown"));
        frame.render_widget(paragraph, area);
        return;
    };

    let title = format!("{} (Esc/←/b to go back)", quote.carrier_name);

    let mut lines = vec![
        Line::from(format!("Zones            {}", zone_label(quote))),
        Line::from(format!(
            "Weight           actual {:.2} kg · volumetric {:.2} kg · chargeable {:.2} kg",
            quote.actual_weight_kg, quote.volumetric_weight_kg, quote.chargeable_weight_kg
        )),
        Line::from(format!("Rate             {} / kg", money(quote.rate_per_kg))),
    ];

    if let Some(reason) = &quote.reason {
        lines.push(Line::styled(
            format!("Not deliverable: {reason}"),
            Style::default().fg(Color::Red),
        ));
    }

    lines.push(Line::from(""));
    lines.push(breakdown_line("Base freight", quote.base_freight));
    for (kind, amount) in quote.surcharges.iter() {
        lines.push(breakdown_line(kind.label(), amount));
    }
    lines.push(
        breakdown_line("Total before tax", quote.total_before_tax)
            .style(Style::default().add_modifier(Modifier::BOLD)),
    );
    lines.push(breakdown_line("GST", quote.tax_amount));
    lines.push(
        breakdown_line("Total", quote.total_after_tax).style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    );

    if !quote.diagnostics.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            "Diagnostics",
            Style::default().add_modifier(Modifier::UNDERLINED),
        ));
        for (key, value) in &quote.diagnostics {
            lines.push(Line::from(format!("  {key}: {value}")));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn breakdown_line(label: &str, amount: f64) -> Line<'static> {
    Line::from(format!("{label:<24}{:>14}", money(amount)))
}

fn zone_label(quote: &QuoteResult) -> String {
    let from = quote.from_zone.as_deref().unwrap_or("?");
    let to = quote.to_zone.as_deref().unwrap_or("?");
    format!("{from} → {to}")
}

fn money(amount: f64) -> String {
    format!("Rs {amount:.2}")
}
