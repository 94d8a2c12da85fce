/// Output formatting: terminal table and JSON.
use elorank_core::{RankedItem, RatingTier};
use serde::Serialize;

#[derive(Serialize)]
struct JsonRankedItem<'a> {
    rank: usize,
    name: &'a str,
    rating: f64,
    comparisons: usize,
    tier: RatingTier,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    items: Vec<JsonRankedItem<'a>>,
    total_comparisons: usize,
    source: Option<&'a str>,
}

fn tier_label(tier: RatingTier) -> &'static str {
    match tier {
        RatingTier::Strong => "+",
        RatingTier::Average => " ",
        RatingTier::Weak => "-",
    }
}

/// Render rankings as a terminal table.
pub fn format_table(rankings: &[RankedItem], total_comparisons: usize) -> String {
    let name_width = rankings.iter()
        .map(|r| r.item.len())
        .max()
        .unwrap_or(4)
        .max(4); // at least "Item"

    let mut out = String::new();
    out.push_str(&format!("  # | {:<name_width$} |  Rating | Comparisons\n", "Item"));
    out.push_str(&format!("----|-{}-|---------|------------\n", "-".repeat(name_width)));

    for (i, r) in rankings.iter().enumerate() {
        out.push_str(&format!(
            "{:>3} | {:<name_width$} | {:>6.0}{} | {:>11}\n",
            i + 1, r.item, r.rating, tier_label(r.tier), r.comparisons,
        ));
    }

    out.push_str(&format!("\n{} items ranked ({} comparisons)\n", rankings.len(), total_comparisons));
    out
}

pub fn print_table(rankings: &[RankedItem], total_comparisons: usize) {
    print!("{}", format_table(rankings, total_comparisons));
}

/// Render rankings as pretty JSON.
pub fn format_json(rankings: &[RankedItem], total_comparisons: usize, source: Option<&str>) -> String {
    let items = rankings
        .iter()
        .enumerate()
        .map(|(i, r)| JsonRankedItem {
            rank: i + 1,
            name: &r.item,
            rating: r.rating,
            comparisons: r.comparisons,
            tier: r.tier,
        })
        .collect();

    let output = JsonOutput {
        items,
        total_comparisons,
        source,
    };

    serde_json::to_string_pretty(&output).unwrap_or_else(|e| crate::bail(format!("Failed to encode rankings: {e}")))
}

pub fn print_json(rankings: &[RankedItem], total_comparisons: usize, source: Option<&str>) {
    println!("{}", format_json(rankings, total_comparisons, source));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rankings() -> Vec<RankedItem> {
        vec![
            RankedItem { item: "sunset.jpg".into(), rating: 1620.4, comparisons: 9, tier: RatingTier::Strong },
            RankedItem { item: "cat.png".into(), rating: 1380.0, comparisons: 9, tier: RatingTier::Weak },
        ]
    }

    #[test]
    fn test_table_lists_items_in_order() {
        let table = format_table(&rankings(), 9);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].contains("Item"));
        assert!(lines[2].contains("sunset.jpg") && lines[2].contains("1620+"));
        assert!(lines[3].contains("cat.png") && lines[3].contains("1380-"));
        assert!(table.contains("2 items ranked (9 comparisons)"));
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&format_json(&rankings(), 9, Some("/pics"))).unwrap();
        assert_eq!(json["items"][0]["rank"], 1);
        assert_eq!(json["items"][0]["name"], "sunset.jpg");
        assert_eq!(json["items"][1]["tier"], "weak");
        assert_eq!(json["total_comparisons"], 9);
        assert_eq!(json["source"], "/pics");
    }
}
