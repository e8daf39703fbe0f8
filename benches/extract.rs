// benches/extract.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use lf_scrape::session::{PlotPage, RawPage};
use lf_scrape::specs::{self, plots::SERIES};

const DAYS: u32 = 268;

fn points(scale: f64) -> String {
    (1..=DAYS)
        .map(|d| format!("{d} {}", (f64::from(d) * scale).round()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn plot_html(n: usize) -> String {
    let series: Vec<String> = (0..n)
        .map(|i| format!("{{ label: 'Contract {}', points: '{}' }}", i + 1, points(1.5 + i as f64)))
        .collect();
    format!(
        "<html><head><title>Plot</title><script type=\"text/javascript\">\
         var chart = new Plot({{ data: [{}] }});</script></head><body></body></html>",
        series.join(", ")
    )
}

fn plot_pages() -> Vec<PlotPage> {
    SERIES
        .iter()
        .map(|(label, n)| PlotPage { label: label.to_string(), html: plot_html(*n) })
        .collect()
}

fn table_doc() -> String {
    let mut doc = String::from("<html><body><table class=ops><tr><th>Day</th>");
    for h in ["INV", "CASH", "JOBIN", "JOBQ", "S1Q", "S2Q", "S3Q", "S1UTIL", "S2UTIL", "S3UTIL"] {
        doc.push_str(&format!("<th>{h}</th>"));
    }
    doc.push_str("</tr>");
    for d in 1..=DAYS {
        doc.push_str(&format!("<tr><td>{d}</td>"));
        for c in 0..10 {
            doc.push_str(&format!("<td>{}</td>", d * 7 + c));
        }
        doc.push_str("</tr>");
    }
    doc.push_str("</table></body></html>");
    doc
}

fn bench_extract(c: &mut Criterion) {
    let one = plot_html(3);
    let pages = RawPage::Plots(plot_pages());
    let table = table_doc();

    c.bench_function("plots_parse_doc", |b| {
        b.iter(|| {
            let series = specs::plots::parse_doc(black_box(&one));
            black_box(series.map_or(0, |s| s.len()))
        })
    });

    c.bench_function("plots_extract_all", |b| {
        b.iter(|| {
            let rows = specs::extract(black_box(&pages)).unwrap_or_default();
            black_box(rows.len())
        })
    });

    c.bench_function("table_extract", |b| {
        b.iter(|| {
            let rows = specs::table::extract(black_box(&table)).unwrap_or_default();
            black_box(rows.len())
        })
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
