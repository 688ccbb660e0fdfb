use crate::config::Schema;
use crate::table::Table;
use serde::Serialize;

/// Dataset statistics shown under the grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub record_count: usize,
    pub column_count: usize,
    /// Sum of the numeric cells of the total column; `None` without that column.
    pub total_sales: Option<f64>,
}

/// One labelled, display-ready figure.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Summary {
    pub fn of(table: &Table, schema: &Schema) -> Self {
        let total_sales = table.has_column(&schema.total_column).then(|| {
            table
                .column_values(&schema.total_column)
                .filter_map(|v| v.as_number())
                .filter(|n| !n.is_nan())
                .sum::<f64>()
        });

        Summary {
            record_count: table.len(),
            column_count: table.column_count(),
            total_sales,
        }
    }

    /// The metrics in display order; the sales total is left out when unknown.
    pub fn metrics(&self) -> Vec<Metric> {
        let mut metrics = vec![
            Metric {
                label: "Aantal Records".to_string(),
                value: self.record_count.to_string(),
            },
            Metric {
                label: "Totaal Aantal Kolommen".to_string(),
                value: self.column_count.to_string(),
            },
        ];
        if let Some(total) = self.total_sales {
            metrics.push(Metric {
                label: "Totale Verkopen".to_string(),
                value: format_euro(total),
            });
        }
        metrics
    }
}

/// Formats an amount as euros with two decimals and thousands separators,
/// e.g. `€1,234.50`.
pub fn format_euro(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let Some((int_part, frac_part)) = fixed.split_once('.') else {
        return format!("€{}", fixed);
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}€{}.{}", sign, grouped, frac_part)
}
