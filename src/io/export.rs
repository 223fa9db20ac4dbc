//! CSV export for system results.

use std::io::{self, Write};

use crate::system::types::{HybridFlatPlateOutput, SystemResult};

/// Column header of [`write_csv`].
const HEADER: &str = "timestamp,irradiance_w_m2,effective_irradiance_w_m2,temp_cell_c,\
                      power_w,power_25_w";

/// Column header of [`write_hybrid_flat_plate_csv`].
const HYBRID_HEADER: &str = "timestamp,aoi_deg,i_sc_a,v_oc_v,i_mp_a,v_mp_v,p_mp_w";

/// Writes a system result as CSV to any writer.
///
/// One row per timestamp in RFC 3339. Scalar outputs (STC power, aperture
/// efficiency) are not repeated per row. Output stops at the shortest series.
///
/// # Arguments
///
/// * `result` - Output of a system orchestrator
/// * `writer` - Destination implementing `Write`
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(result: &SystemResult, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    let rows = result
        .timestamps
        .iter()
        .zip(&result.irradiance)
        .zip(&result.effective_irradiance)
        .zip(&result.temp_cell)
        .zip(&result.power)
        .zip(&result.power_25);
    for (((((t, irradiance), effective), temp_cell), power), power_25) in rows {
        wtr.write_record(&[
            t.to_rfc3339(),
            format!("{irradiance:.3}"),
            format!("{effective:.3}"),
            format!("{temp_cell:.3}"),
            format!("{power:.4}"),
            format!("{power_25:.4}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the operating points of a hybrid flat plate as CSV.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_hybrid_flat_plate_csv(
    output: &HybridFlatPlateOutput,
    timestamps: &[chrono::DateTime<chrono::Utc>],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HYBRID_HEADER.split(',').map(str::trim))?;

    for ((t, mpp), aoi) in timestamps.iter().zip(&output.mpp).zip(&output.aoi) {
        wtr.write_record(&[
            t.to_rfc3339(),
            format!("{aoi:.3}"),
            format!("{:.4}", mpp.i_sc),
            format!("{:.4}", mpp.v_oc),
            format!("{:.4}", mpp.i_mp),
            format!("{:.4}", mpp.v_mp),
            format!("{:.4}", mpp.p_mp),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::diode::MaxPowerPoint;
    use chrono::{TimeZone, Utc};

    fn make_result(n: usize) -> SystemResult {
        SystemResult {
            timestamps: (0..n)
                .map(|h| Utc.with_ymd_and_hms(2021, 6, 21, h as u32, 0, 0).unwrap())
                .collect(),
            irradiance: vec![800.0; n],
            effective_irradiance: vec![780.5; n],
            temp_cell: vec![48.25; n],
            power: vec![1500.0; n],
            power_25: vec![1650.0; n],
            stc_power: 2000.0,
            area: 10.0,
            aperture_efficiency: 0.2,
        }
    }

    fn write(result: &SystemResult) -> String {
        let mut buf = Vec::new();
        write_csv(result, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_lists_series() {
        let output = write(&make_result(1));
        assert_eq!(
            output.lines().next(),
            Some(
                "timestamp,irradiance_w_m2,effective_irradiance_w_m2,temp_cell_c,\
                 power_w,power_25_w"
            )
        );
    }

    #[test]
    fn row_count_matches_samples() {
        let output = write(&make_result(24));
        // 1 header + 24 data rows
        assert_eq!(output.lines().count(), 25);
    }

    #[test]
    fn deterministic_output() {
        let r = make_result(5);
        assert_eq!(write(&r), write(&r));
    }

    #[test]
    fn rows_parse_back() {
        let buf = write(&make_result(3));
        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_bytes());
        let mut rows = 0;
        for record in rdr.records() {
            let rec = record.unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(&rec[0]).is_ok());
            for i in 1..6 {
                assert!(rec[i].parse::<f64>().is_ok(), "column {i}");
            }
            assert_eq!(&rec[3], "48.250");
            rows += 1;
        }
        assert_eq!(rows, 3);
    }

    #[test]
    fn ragged_series_stop_at_shortest() {
        let mut r = make_result(4);
        r.power.truncate(2);
        r.temp_cell.push(50.0);
        let output = write(&r);
        // 1 header + 2 complete rows
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn hybrid_rows_follow_timestamps() {
        let out = HybridFlatPlateOutput {
            mpp: vec![
                MaxPowerPoint {
                    i_sc: 10.0,
                    v_oc: 50.0,
                    i_mp: 9.5,
                    v_mp: 42.0,
                    p_mp: 399.0,
                };
                2
            ],
            aoi: vec![12.0, 70.0],
        };
        let ts = make_result(2).timestamps;
        let mut buf = Vec::new();
        write_hybrid_flat_plate_csv(&out, &ts, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with(",70.000,10.0000,50.0000,9.5000,42.0000,399.0000"));
    }
}
