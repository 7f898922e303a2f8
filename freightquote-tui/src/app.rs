use std::sync::Arc;

use chrono::{DateTime, Local};
use freightquote_core::{
    CarrierId, ParcelItem, QuoteRequest, QuoteResult, QuoteService, ServiceSubtype, TaxMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    RequestForm,
    QuoteList,
    QuoteDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Origin,
    Destination,
    Weight,
    Length,
    Breadth,
    Height,
    DeclaredValue,
    StorageDays,
    Service,
    ReversePickup,
    SpecialHandling,
    Tax,
}

impl Field {
    pub(crate) const ALL: [Self; 12] = [
        Self::Origin,
        Self::Destination,
        Self::Weight,
        Self::Length,
        Self::Breadth,
        Self::Height,
        Self::DeclaredValue,
        Self::StorageDays,
        Self::Service,
        Self::ReversePickup,
        Self::SpecialHandling,
        Self::Tax,
    ];

    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Origin => "Origin pincode",
            Self::Destination => "Destination pincode",
            Self::Weight => "Weight (kg)",
            Self::Length => "Length (cm)",
            Self::Breadth => "Breadth (cm)",
            Self::Height => "Height (cm)",
            Self::DeclaredValue => "Declared value",
            Self::StorageDays => "Storage days",
            Self::Service => "Bigship service",
            Self::ReversePickup => "Reverse pickup",
            Self::SpecialHandling => "Special handling",
            Self::Tax => "GST rate",
        }
    }

    /// Toggled with Space or the arrow keys instead of typed.
    pub(crate) const fn is_toggle(self) -> bool {
        matches!(
            self,
            Self::Service | Self::ReversePickup | Self::SpecialHandling | Self::Tax
        )
    }
}

/// Raw form input; parsed into a [`QuoteRequest`] when the user asks for quotes.
#[derive(Debug, Clone, Default)]
pub(crate) struct RequestForm {
    pub(crate) origin: String,
    pub(crate) destination: String,
    pub(crate) weight: String,
    pub(crate) length: String,
    pub(crate) breadth: String,
    pub(crate) height: String,
    pub(crate) declared_value: String,
    pub(crate) storage_days: String,
    pub(crate) service: Option<ServiceSubtype>,
    pub(crate) reverse_pickup: bool,
    pub(crate) special_handling: bool,
    pub(crate) tax_mode: TaxMode,
    pub(crate) items: Vec<ParcelItem>,
}

impl RequestForm {
    pub(crate) fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Origin => Some(&mut self.origin),
            Field::Destination => Some(&mut self.destination),
            Field::Weight => Some(&mut self.weight),
            Field::Length => Some(&mut self.length),
            Field::Breadth => Some(&mut self.breadth),
            Field::Height => Some(&mut self.height),
            Field::DeclaredValue => Some(&mut self.declared_value),
            Field::StorageDays => Some(&mut self.storage_days),
            Field::Service | Field::ReversePickup | Field::SpecialHandling | Field::Tax => None,
        }
    }

    pub(crate) fn toggle(&mut self, field: Field) {
        match field {
            Field::Service => {
                self.service = match self.service {
                    None => Some(ServiceSubtype::Ltl),
                    Some(ServiceSubtype::Ltl) => Some(ServiceSubtype::Cft),
                    Some(ServiceSubtype::Cft) => Some(ServiceSubtype::Mps),
                    Some(ServiceSubtype::Mps) => None,
                };
            }
            Field::ReversePickup => self.reverse_pickup = !self.reverse_pickup,
            Field::SpecialHandling => self.special_handling = !self.special_handling,
            Field::Tax => {
                self.tax_mode = match self.tax_mode {
                    TaxMode::Standard => TaxMode::Reduced,
                    TaxMode::Reduced => TaxMode::Standard,
                };
            }
            _ => {}
        }
    }

    pub(crate) fn display_value(&self, field: Field) -> String {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" }.to_owned();
        match field {
            Field::Origin => self.origin.clone(),
            Field::Destination => self.destination.clone(),
            Field::Weight => self.weight.clone(),
            Field::Length => self.length.clone(),
            Field::Breadth => self.breadth.clone(),
            Field::Height => self.height.clone(),
            Field::DeclaredValue => self.declared_value.clone(),
            Field::StorageDays => self.storage_days.clone(),
            Field::Service => self
                .service
                .map_or_else(|| "carrier default".to_owned(), |subtype| subtype.to_string()),
            Field::ReversePickup => yes_no(self.reverse_pickup),
            Field::SpecialHandling => yes_no(self.special_handling),
            Field::Tax => match self.tax_mode {
                TaxMode::Standard => "standard".to_owned(),
                TaxMode::Reduced => "reduced".to_owned(),
            },
        }
    }

    /// Item described by the weight and dimension fields. Blank fields count as zero,
    /// which the item rejects for the weight.
    pub(crate) fn current_item(&self) -> Result<ParcelItem, String> {
        ParcelItem::new(
            parse_amount(Field::Weight, &self.weight)?,
            parse_amount(Field::Length, &self.length)?,
            parse_amount(Field::Breadth, &self.breadth)?,
            parse_amount(Field::Height, &self.height)?,
        )
        .map_err(|err| err.to_string())
    }

    /// Move the current item into the item list and clear its fields.
    pub(crate) fn add_item(&mut self) -> Result<(), String> {
        let item = self.current_item()?;
        self.items.push(item);
        for field in [Field::Weight, Field::Length, Field::Breadth, Field::Height] {
            if let Some(text) = self.text_mut(field) {
                text.clear();
            }
        }
        Ok(())
    }

    /// Build the request. Without added items the current item fields are used.
    pub(crate) fn build_request(&self) -> Result<QuoteRequest, String> {
        let origin = self.origin.trim();
        let destination = self.destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err("Enter origin and destination pincodes".to_owned());
        }

        let items = if self.items.is_empty() {
            vec![self.current_item()?]
        } else {
            self.items.clone()
        };
        let mut request = QuoteRequest::new(origin, destination, items);
        if !self.declared_value.trim().is_empty() {
            request.declared_value = Some(parse_amount(
                Field::DeclaredValue,
                &self.declared_value,
            )?);
        }
        let days = self.storage_days.trim();
        if !days.is_empty() {
            request.storage_days = days
                .parse()
                .map_err(|_err| format!("{} must be a whole number", Field::StorageDays.label()))?;
        }
        request.service_subtype = self.service;
        request.reverse_pickup = self.reverse_pickup;
        request.special_handling = self.special_handling;
        request.tax_mode = self.tax_mode;
        request.validate().map_err(|err| err.to_string())?;
        Ok(request)
    }
}

fn parse_amount(field: Field, raw: &str) -> Result<f64, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .map_err(|_err| format!("{} must be a number, got {raw:?}", field.label()))
}

pub(crate) struct App {
    pub(crate) service: Arc<QuoteService>,

    pub(crate) screen: Screen,
    pub(crate) carriers: Vec<(CarrierId, String)>,

    pub(crate) form: RequestForm,
    pub(crate) field_index: usize,

    pub(crate) results: Vec<QuoteResult>,
    pub(crate) result_index: usize,
    pub(crate) quoted_at: Option<DateTime<Local>>,

    pub(crate) is_loading: bool,
    pub(crate) error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<QuoteService>) -> Self {
        let carriers = service.carriers();
        Self {
            service,
            screen: Screen::RequestForm,
            carriers,
            form: RequestForm::default(),
            field_index: 0,
            results: Vec::new(),
            result_index: 0,
            quoted_at: None,
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn selected_field(&self) -> Field {
        Field::ALL
            .get(self.field_index)
            .copied()
            .unwrap_or(Field::Origin)
    }

    pub(crate) fn next_field(&mut self) {
        self.field_index = (self.field_index + 1) % Field::ALL.len();
    }

    pub(crate) fn previous_field(&mut self) {
        self.field_index = self
            .field_index
            .checked_sub(1)
            .unwrap_or(Field::ALL.len() - 1);
    }

    pub(crate) fn selected_result(&self) -> Option<&QuoteResult> {
        self.results.get(self.result_index)
    }

    pub(crate) fn show_results(&mut self, results: Vec<QuoteResult>) {
        self.results = results;
        self.result_index = 0;
        self.quoted_at = Some(Local::now());
        self.screen = Screen::QuoteList;
    }
}
