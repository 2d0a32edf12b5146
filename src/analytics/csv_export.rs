use super::{listing_label, ListingPrices};
use crate::error::{PriceMonitorError, Result};
use crate::models::{Listing, PriceSample};

/// Column headers of the analytics export, in order.
pub const CSV_HEADER: [&str; 6] = [
    "Fecha",
    "Establecimiento",
    "Precio por Noche",
    "Disponible",
    "Min Noches",
    "Total Estadía",
];

const AVAILABLE_YES: &str = "Sí";
const AVAILABLE_NO: &str = "No";

/// Render the raw analytics rows as CSV.
///
/// Rows follow the result order, and within each listing the order the
/// backend returned the samples in. Missing numbers are empty cells.
pub fn analytics_csv(results: &[ListingPrices], listings: &[Listing]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    for result in results {
        let name = listing_label(result.listing_id, listings);
        for sample in &result.prices {
            writer.write_record(row(&name, sample))?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PriceMonitorError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| PriceMonitorError::InvalidArgument(e.to_string()))
}

fn row(name: &str, sample: &PriceSample) -> [String; 6] {
    [
        sample.date.clone(),
        name.to_string(),
        number_cell(sample.price_per_night),
        if sample.is_available() {
            AVAILABLE_YES
        } else {
            AVAILABLE_NO
        }
        .to_string(),
        sample.min_nights.map(|n| n.to_string()).unwrap_or_default(),
        number_cell(sample.stay_total),
    ]
}

fn number_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
