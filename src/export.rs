//! CSV Export
//!
//! Day sheet of calendar bookings for spreadsheets: UTF-8 with a BOM so
//! Excel picks the encoding, `;` as the delimiter.

use crate::api::AdminBooking;

const BOM: &str = "\u{feff}";

/// Render the bookings of one day as CSV
pub fn bookings_csv(bookings: &[AdminBooking]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record(["ID", "Time", "Table", "Guests", "Client", "Status"])?;
    for b in bookings {
        writer.write_record([
            b.id.to_string(),
            b.booking_at.format("%H:%M").to_string(),
            b.table_no.to_string(),
            b.guests.to_string(),
            b.client_name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Guest".to_string()),
            b.status.label().to_string(),
        ])?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(format!("{}{}", BOM, String::from_utf8_lossy(&data)))
}
