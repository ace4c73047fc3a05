//! Unit tests for the SqlBuilder query construction.

use bookings_analyst::sql_builder::quote_ident;
use bookings_analyst::SqlBuilder;

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_quoted_table() {
    let (sql, params) = SqlBuilder::new("records").build();
    assert_eq!(sql, "SELECT *\nFROM \"records\"");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("records")
        .select(&["city", "SUM(price) AS revenue"])
        .build();
    assert!(sql.starts_with("SELECT city, SUM(price) AS revenue\n"));
}

#[test]
fn quote_ident_escapes_embedded_quotes() {
    assert_eq!(quote_ident("city"), "\"city\"");
    assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
}

// ---------------------------------------------------------------------------
// WHERE conditions
// ---------------------------------------------------------------------------

#[test]
fn where_eq_adds_equality_with_param() {
    let (sql, params) = SqlBuilder::new("records")
        .where_eq("city", "Pune")
        .build();
    assert!(sql.contains("WHERE \"city\" = ?"));
    assert_eq!(params, vec!["Pune"]);
}

#[test]
fn where_between_binds_both_bounds() {
    let (sql, params) = SqlBuilder::new("records")
        .where_between("collection_date", "2025-01-01", "2025-01-07")
        .build();
    assert!(sql.contains("\"collection_date\" BETWEEN ? AND ?"));
    assert_eq!(params, vec!["2025-01-01", "2025-01-07"]);
}

#[test]
fn where_present_excludes_null_and_blank() {
    let (sql, params) = SqlBuilder::new("records")
        .where_present("source")
        .build();
    assert!(sql.contains("\"source\" IS NOT NULL AND TRIM(\"source\") <> ''"));
    assert!(params.is_empty());
}

#[test]
fn where_not_null_adds_check() {
    let (sql, _) = SqlBuilder::new("records")
        .where_not_null("collection_time_hour")
        .build();
    assert!(sql.contains("\"collection_time_hour\" IS NOT NULL"));
}

#[test]
fn where_clause_appends_params_in_order() {
    let (sql, params) = SqlBuilder::new("records")
        .where_eq("city", "Pune")
        .where_clause("price > ?", &["100"])
        .build();
    assert!(sql.contains("\"city\" = ?"));
    assert!(sql.contains("price > ?"));
    assert_eq!(params, vec!["Pune", "100"]);
}

#[test]
fn multiple_where_clauses_joined_with_and() {
    let (sql, _) = SqlBuilder::new("records")
        .where_eq("city", "Pune")
        .where_eq("source", "web")
        .build();
    assert!(sql.contains("WHERE \"city\" = ? AND \"source\" = ?"));
}

// ---------------------------------------------------------------------------
// DISTINCT / GROUP BY / ORDER BY / LIMIT
// ---------------------------------------------------------------------------

#[test]
fn distinct_adds_keyword() {
    let (sql, _) = SqlBuilder::new("records").distinct().build();
    assert!(sql.starts_with("SELECT DISTINCT *"));
}

#[test]
fn group_by_adds_clause() {
    let (sql, _) = SqlBuilder::new("records")
        .select(&["city", "COUNT(*) AS bookings"])
        .group_by(&["city"])
        .build();
    assert!(sql.contains("GROUP BY city"));
}

#[test]
fn order_by_adds_clause() {
    let (sql, _) = SqlBuilder::new("records")
        .order_by(&["revenue DESC", "city ASC"])
        .build();
    assert!(sql.contains("ORDER BY revenue DESC, city ASC"));
}

#[test]
fn limit_adds_clause() {
    let (sql, _) = SqlBuilder::new("records").limit(10).build();
    assert!(sql.ends_with("LIMIT 10"));
}

// ---------------------------------------------------------------------------
// Combined / chained
// ---------------------------------------------------------------------------

#[test]
fn grouped_revenue_query_chains_correctly() {
    let (sql, params) = SqlBuilder::new("records")
        .select(&["\"city\" AS \"city\"", "SUM(\"price\") AS revenue"])
        .where_between("collection_date", "2025-01-04", "2025-01-10")
        .where_present("city")
        .group_by(&["\"city\""])
        .order_by(&["revenue DESC", "\"city\" ASC"])
        .limit(3)
        .build();

    assert_eq!(
        sql,
        "SELECT \"city\" AS \"city\", SUM(\"price\") AS revenue\n\
         FROM \"records\"\n\
         WHERE \"collection_date\" BETWEEN ? AND ? AND \"city\" IS NOT NULL AND TRIM(\"city\") <> ''\n\
         GROUP BY \"city\"\n\
         ORDER BY revenue DESC, \"city\" ASC\n\
         LIMIT 3"
    );
    assert_eq!(params, vec!["2025-01-04", "2025-01-10"]);
}
