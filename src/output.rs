//! Terminal rendering of report summaries and, with `show_plots`, chart series.

use analytics::Notice;
use chrono::NaiveDate;
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::settings::Config;
use reports::chart::Line;
use reports::sellers::ParetoChart;
use reports::{BrandReport, ComparisonReport, CryptoReport, ProfitReport, SalesReport, SellerReport};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

pub fn print_artifacts(paths: &[PathBuf]) {
    for path in paths {
        println!("Wrote {}", path.display());
    }
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        println!("Note: {notice}");
    }
}

pub fn print_sales(config: &Config, report: &SalesReport) {
    let ccode = &config.report.currency_code;
    let summary = &report.summary;
    let mut t = table(vec!["Metric", "Value"]);
    t.add_row(vec!["Median price".to_string(), format!("{ccode}{}", summary.median_price)]);
    match &summary.break_even {
        Some(thresholds) => {
            t.add_row(vec!["Estimated break even".to_string(), format!("{ccode}{}", thresholds.estimated)]);
            t.add_row(vec!["Minimum break even".to_string(), format!("{ccode}{}", thresholds.minimum)]);
        }
        None => {
            t.add_row(vec!["Break even".to_string(), "n/a (no MSRP)".to_string()]);
        }
    }
    t.add_row(vec!["Total sold".to_string(), summary.total_sold.to_string()]);
    t.add_row(vec![
        "Estimated shipping".to_string(),
        format!("{ccode}{}", summary.estimated_shipping),
    ]);
    println!("{}\n{t}", report.title);
    print_notices(&report.notices);

    if config.report.show_plots {
        let mut daily = table(vec!["Date", "Median", "Mean", "Min", "Max", "Listings", "Quantity"]);
        for d in &report.daily {
            daily.add_row(vec![
                d.date.to_string(),
                d.median_price.to_string(),
                d.mean_price.round_dp(2).to_string(),
                d.min_price.to_string(),
                d.max_price.to_string(),
                d.listing_count.to_string(),
                d.total_quantity.to_string(),
            ]);
        }
        println!("{daily}");
    }
}

pub fn print_profits(config: &Config, report: &ProfitReport) {
    let ccode = &config.report.currency_code;
    println!("{}", report.title);
    match &report.summary {
        Some(summary) => {
            let mut t = table(vec!["Platform", "Payment", "Seller"]);
            t.add_row(vec![
                format!("{ccode}{}", summary.platform.round_dp(2)),
                format!("{ccode}{}", summary.payment.round_dp(2)),
                format!("{ccode}{}", summary.seller.round_dp(2)),
            ]);
            println!("{t}");
        }
        None => println!("No profit split (MSRP unknown or no sales)."),
    }
    print_notices(&report.notices);

    if config.report.show_plots {
        let mut t = table(vec!["Date", "Cum Sales", "Cum Quantity", "Cum Platform", "Cum Payment", "Cum Seller"]);
        for p in &report.cumulative {
            t.add_row(vec![
                p.date.to_string(),
                p.cum_sales.round_dp(2).to_string(),
                p.cum_quantity.to_string(),
                p.cum_platform.round_dp(2).to_string(),
                p.cum_payment.round_dp(2).to_string(),
                p.cum_seller.round_dp(2).to_string(),
            ]);
        }
        println!("{t}");
    }
}

pub fn print_comparison(config: &Config, report: &ComparisonReport) {
    for chart in [&report.percent_msrp, &report.currency] {
        println!("{} (floor {})", chart.title, chart.y_floor.round_dp(2));
        if config.report.show_plots {
            let lines: Vec<&Line> = chart.items.iter().map(|i| &i.line).collect();
            println!("{}", series_table(&lines));
        }
    }
    for item in &report.skipped_items {
        println!("Skipped {item} on the % MSRP chart: no MSRP.");
    }
    print_notices(&report.notices);
}

pub fn print_crypto(config: &Config, report: &CryptoReport) {
    let mut t = table(vec!["Item", "Hash rate", "Days"]);
    for item in &report.items {
        t.add_row(vec![
            item.line.label.clone(),
            item.hash_rate.to_string(),
            item.line.points.len().to_string(),
        ]);
    }
    println!("{} ({} from {} to {})\n{t}", report.title, report.symbol, report.start, report.end);
    print_notices(&report.notices);

    if config.report.show_plots {
        let mut lines: Vec<&Line> = report.items.iter().map(|i| &i.line).collect();
        lines.push(&report.normalized_price);
        println!("{}", series_table(&lines));
    }
}

pub fn print_sellers(report: &SellerReport) {
    print_pareto(&report.feedback);
    print_pareto(&report.sales_count);
    print_notices(&report.notices);
}

fn print_pareto(chart: &ParetoChart) {
    let mut t = table(vec![chart.x_label, "Non-Store", "Store", "All", "Cumulative %"]);
    for row in &chart.breakdown.rows {
        t.add_row(vec![
            row.label.clone(),
            row.non_store.to_string(),
            row.store.to_string(),
            row.all.to_string(),
            format!("{:.1}", row.cumulative_share * 100.0),
        ]);
    }
    println!("{}\n{t}", chart.title);
}

pub fn print_brands(config: &Config, report: &BrandReport) {
    let ccode = &config.report.currency_code;
    let mut t = table(vec!["Item", "Brand", "Listings", "Mean", "Total"]);
    for row in &report.stats {
        t.add_row(vec![
            row.item.clone(),
            row.brand.clone(),
            row.listings.to_string(),
            format!("{ccode}{}", row.mean_price),
            format!("{ccode}{}", row.total_price),
        ]);
    }
    println!("{}\n{t}", report.title);
    print_notices(&report.notices);

    if config.report.show_plots {
        let lines: Vec<&Line> = report.lines.iter().collect();
        println!("{}", series_table(&lines));
    }
}

/// One row per date, one column per line; blank where a line has no point.
fn series_table(lines: &[&Line]) -> Table {
    let mut header = vec!["Date"];
    header.extend(lines.iter().map(|l| l.label.as_str()));
    let mut t = table(header);

    let mut rows: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
    for (column, line) in lines.iter().enumerate() {
        for (date, value) in &line.points {
            let row = rows.entry(*date).or_insert_with(|| vec![String::new(); lines.len()]);
            row[column] = value.round_dp(2).to_string();
        }
    }
    for (date, values) in rows {
        let mut cells = vec![date.to_string()];
        cells.extend(values);
        t.add_row(cells);
    }
    t
}
