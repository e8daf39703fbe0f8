// tests/extract_table.rs
use lf_scrape::session::RawPage;
use lf_scrape::specs;
use lf_scrape::{Error, Field};

const PAGE: &str = r#"<html><head><title>Littlefield Technologies</title></head>
<body>
<table class="menu"><tr><td><a href="Standing">Standing</a></td><td>Day 1</td></tr></table>
<TABLE border=1 id="ops">
  <THEAD>
  <tr><th>Day</th><th>INV</th><th>Cash</th><th>JOBIN</th><th>Notes</th><th>S1UTIL</th><th>JOBOUT0</th></tr>
  </THEAD>
  <tr class="odd"><td>1</td><td>9,480</td><td>$1,000,000.00</td><td>12</td><td>start</td><td>85%</td><td>2</td></tr>
  <tr><td>2</td><td>9,360</td><td>$998,120.50</td><td>9</td><td></td><td>N/A</td><td>4</td></tr>
  <tr><td>Total</td><td>-</td><td></td><td>21</td><td></td><td></td><td>6</td></tr>
  <tr><td>3</td><td>9,300</td><td>(1,500)</td><td>10</td><td></td><td>0.91</td><td>5</td></tr>
  <tr><td>3</td><td>9,250</td><td>(1,400)</td><td>11</td><td></td><td>0.92</td><td>5</td></tr>
</TABLE>
</body></html>"#;

fn extract(doc: &str) -> Result<Vec<lf_scrape::Record>, Error> {
    specs::extract(&RawPage::Table(doc.to_string()))
}

#[test]
fn finds_table_by_header_not_position() {
    let recs = extract(PAGE).unwrap();
    let days: Vec<u32> = recs.iter().map(|r| r.day).collect();
    assert_eq!(days, vec![1, 2, 3]);

    assert_eq!(recs[0].get(Field::Inv), Some(9480.0));
    assert_eq!(recs[0].get(Field::Cash), Some(1_000_000.0));
    assert_eq!(recs[0].get(Field::S1Util), Some(85.0));
    assert_eq!(recs[1].get(Field::Cash), Some(998_120.5));
}

#[test]
fn non_numeric_cells_become_null() {
    let recs = extract(PAGE).unwrap();
    assert_eq!(recs[1].get(Field::S1Util), None);
    // Columns the page doesn't have stay null too
    assert_eq!(recs[1].get(Field::JobRev2), None);
}

#[test]
fn last_duplicate_day_wins() {
    let recs = extract(PAGE).unwrap();
    assert_eq!(recs[2].get(Field::Inv), Some(9250.0));
    assert_eq!(recs[2].get(Field::Cash), Some(-1400.0));
}

#[test]
fn backlog_is_derived_when_the_page_has_none() {
    let recs = extract(PAGE).unwrap();
    // cumulative JOBIN - cumulative JOBOUT0: 12-2, 21-6, 32-11
    let backlog: Vec<_> = recs.iter().map(|r| r.get(Field::Backlog)).collect();
    assert_eq!(backlog, vec![Some(10.0), Some(15.0), Some(21.0)]);
}

#[test]
fn header_in_first_row_of_td_cells() {
    let doc = "<table><tr><td>Sim Day</td><td>Station 1 Queue</td><td>Backlog</td></tr>\
               <tr><td>7</td><td>3</td><td>40</td></tr></table>";
    let recs = extract(doc).unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].day, 7);
    assert_eq!(recs[0].get(Field::S1Q), Some(3.0));
    assert_eq!(recs[0].get(Field::Backlog), Some(40.0));
}

#[test]
fn bad_day_rows_are_dropped_not_fatal() {
    let doc = "<table><tr><th>Day</th><th>INV</th></tr>\
               <tr><td>0</td><td>1</td></tr>\
               <tr><td>2.5</td><td>1</td></tr>\
               <tr><td>abc</td><td>1</td></tr>\
               <tr><td>4</td><td>1</td></tr></table>";
    let recs = extract(doc).unwrap();
    assert_eq!(recs.iter().map(|r| r.day).collect::<Vec<_>>(), vec![4]);
}

#[test]
fn missing_table_is_a_parse_error() {
    let login_again = r#"<form action="/CheckAccess"><input type=password name=password></form>"#;
    assert!(matches!(extract(login_again), Err(Error::Parse(_))));

    let unrelated = "<table><tr><th>Day</th><th>Team</th></tr><tr><td>1</td><td>x</td></tr></table>";
    assert!(matches!(extract(unrelated), Err(Error::Parse(_))));
}

#[test]
fn header_only_table_is_empty_not_an_error() {
    let doc = "<table><tr><th>Day</th><th>CASH</th></tr></table>";
    assert!(extract(doc).unwrap().is_empty());
}
