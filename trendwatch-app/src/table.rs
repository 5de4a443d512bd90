use trendwatch_web::TrendRecord;

pub const SECTION_RULE_WIDTH: usize = 80;

const TITLE_RULE_WIDTH: usize = 70;
const HEADER_RULE: &str = "----+---------------------------+------------+-----------------";

fn row(no: &str, trend: &str, volume: &str, trending_for: &str) -> String {
    format!("{no:<4} | {trend:<25} | {volume:<10} | {trending_for:<15}")
}

/// Plain-text table: title, rule, header, then one 1-based row per record.
pub fn render_table(title: &str, records: &[TrendRecord]) -> String {
    let mut lines = vec![
        title.to_string(),
        "-".repeat(TITLE_RULE_WIDTH),
        row("No.", "Trend", "Volume", "Trending For"),
        HEADER_RULE.to_string(),
    ];
    lines.extend(records.iter().enumerate().map(|(i, r)| {
        row(&(i + 1).to_string(), &r.trend_text, &r.volume, &r.trending_for)
    }));
    lines.join("\n")
}

pub fn section_rule() -> String {
    "=".repeat(SECTION_RULE_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(t: &str, v: &str, tf: &str) -> TrendRecord {
        TrendRecord {
            trend_text: t.into(),
            volume: v.into(),
            trending_for: tf.into(),
        }
    }

    #[test]
    fn header_and_rules() {
        let out = render_table("Top 12 Global Trends (EN)", &[]);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Top 12 Global Trends (EN)");
        assert_eq!(lines[1], "-".repeat(70));
        assert_eq!(
            lines[2],
            "No.  | Trend                     | Volume     | Trending For   "
        );
        assert_eq!(lines[3], HEADER_RULE);
    }

    #[test]
    fn rows_are_numbered_from_one_and_padded() {
        let out = render_table(
            "t",
            &[rec("Liverpool", "255K", "5 hrs"), rec("Trudeau", "", "")],
        );
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines[4],
            "1    | Liverpool                 | 255K       | 5 hrs          "
        );
        assert!(lines[5].starts_with("2    | Trudeau "));
    }

    #[test]
    fn long_trends_are_not_truncated() {
        let long = "A trend name that is much longer than the column";
        let out = render_table("t", &[rec(long, "1K", "")]);
        assert!(out.contains(long));
    }

    #[test]
    fn rules_have_fixed_widths() {
        assert_eq!(HEADER_RULE.matches('+').count(), 3);
        assert_eq!(HEADER_RULE.len(), 63);
        assert_eq!(section_rule().len(), 80);
    }
}
