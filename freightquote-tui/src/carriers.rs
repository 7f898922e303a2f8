use freightquote_carrier_anjani as anjani;
use freightquote_carrier_bigship as bigship;
use freightquote_carrier_bluedart as bluedart;
use freightquote_carrier_globalcargo as globalcargo;
use freightquote_carrier_safexpress as safexpress;
use freightquote_core::{CarrierPlugin, ConfigError, Settings};

/// Every carrier the terminal UI quotes, in registration order.
pub(crate) fn plugins(settings: &Settings) -> Result<Vec<CarrierPlugin>, ConfigError> {
    Ok(vec![
        globalcargo::plugin(settings)?,
        safexpress::plugin(settings)?,
        bluedart::plugin(settings)?,
        anjani::plugin(settings)?,
        bigship::plugin(settings)?,
        bigship::metro_plugin(settings)?,
    ])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use freightquote_core::pipeline::SurchargeKind;
    use freightquote_core::registry::LocationRegistry;
    use freightquote_core::{
        CarrierId, CarrierRegistry, Location, ParcelItem, QuoteRequest, QuoteResult,
        QuoteService, ServiceSubtype,
    };

    use super::*;

    fn location(code: &str, state: &str, city: &str, oda: bool) -> Location {
        CarrierId::ALL.into_iter().fold(
            Location::unresolved(code).with_state(state).with_city(city),
            |location, carrier| location.with_oda(carrier, oda).with_serviceable(carrier, true),
        )
    }

    fn service() -> QuoteService {
        let locations = LocationRegistry::new(vec![
            location("110001", "Delhi", "New Delhi", false),
            location("400001", "Maharashtra", "Mumbai", false),
            location("413001", "Maharashtra", "Solapur", true),
            location("682001", "Kerala", "Kochi", true),
            location("795001", "Manipur", "Imphal", false),
        ]);
        let registry = CarrierRegistry::new(plugins(&Settings::default()).expect("plugins build"));
        QuoteService::new(Arc::new(registry), Arc::new(locations))
    }

    fn has_two_decimals(amount: f64) -> bool {
        let cents = amount * 100.0;
        (cents - cents.round()).abs() < 1e-6
    }

    fn assert_consistent(quote: &QuoteResult) {
        let carrier = &quote.carrier_name;
        assert!(quote.deliverable, "{carrier}: {:?}", quote.reason);
        let summed = quote.base_freight + quote.surcharges.total();
        assert!(
            (summed - quote.total_before_tax).abs() < 0.005,
            "{carrier}: base {} plus surcharges {} is not {}",
            quote.base_freight,
            quote.surcharges.total(),
            quote.total_before_tax
        );
        let mut amounts = vec![
            ("base freight", quote.base_freight),
            ("total before tax", quote.total_before_tax),
            ("tax", quote.tax_amount),
            ("total after tax", quote.total_after_tax),
        ];
        amounts.extend(quote.surcharges.iter().map(|(kind, amount)| (kind.label(), amount)));
        for (label, amount) in amounts {
            assert!(
                has_two_decimals(amount),
                "{carrier}: {label} {amount} has more than two decimals"
            );
        }
    }

    fn item(weight: f64) -> ParcelItem {
        ParcelItem::new(weight, 47.0, 33.0, 29.0).expect("valid item")
    }

    fn requests() -> Vec<QuoteRequest> {
        let lanes = [
            ("110001", "400001"),
            ("110001", "413001"),
            ("400001", "682001"),
            ("110001", "795001"),
            ("400001", "110001"),
        ];
        let mut requests = Vec::new();
        for (origin, destination) in lanes {
            for weight in [0.7, 13.3, 137.45] {
                let request = QuoteRequest::new(origin, destination, vec![item(weight)])
                    .with_declared_value(73_333.33);
                requests.push(request.clone());
                for subtype in [ServiceSubtype::Cft, ServiceSubtype::Mps] {
                    requests.push(request.clone().with_subtype(subtype));
                }
            }
        }
        requests
    }

    #[test]
    fn registers_every_carrier_once() {
        let service = service();
        let mut carriers: Vec<CarrierId> = service
            .carriers()
            .into_iter()
            .map(|(carrier, _)| carrier)
            .collect();
        carriers.sort();
        let mut expected = CarrierId::ALL.to_vec();
        expected.sort();
        assert_eq!(carriers, expected);
    }

    #[test]
    fn every_quote_adds_up_to_whole_paise() {
        let service = service();
        for request in requests() {
            let results = service.quote_all(&request);
            assert_eq!(results.len(), CarrierId::ALL.len());
            for quote in &results {
                assert_consistent(quote);
            }
        }
    }

    #[test]
    fn oda_destination_adds_the_carrier_remote_area_line() {
        let service = service();
        let request = QuoteRequest::new("110001", "413001", vec![item(40.0)]);
        for quote in service.quote_all(&request) {
            assert_consistent(&quote);
            let expected = match quote.carrier {
                CarrierId::GlobalCargo | CarrierId::Bluedart | CarrierId::Bigship => {
                    Some(SurchargeKind::Oda)
                }
                CarrierId::Safexpress => Some(SurchargeKind::SafeExtension),
                CarrierId::Anjani | CarrierId::BigshipMetro => None,
            };
            let remote: Vec<SurchargeKind> = quote
                .surcharges
                .iter()
                .map(|(kind, _)| kind)
                .filter(|kind| matches!(kind, SurchargeKind::Oda | SurchargeKind::SafeExtension))
                .collect();
            assert_eq!(remote, expected.into_iter().collect::<Vec<_>>(), "{}", quote.carrier_name);
        }
    }
}
