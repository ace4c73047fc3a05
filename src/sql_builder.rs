//! SQL builder with parameterized query construction.
//!
//! All user-supplied values go through DuckDB's parameter binding (`?` placeholders),
//! never through string interpolation. Column names come from the
//! [`Schema`](crate::config::Schema) and are quoted with [`quote_ident`].
//! Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use bookings_analyst::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("records")
//!     .select(&["city", "SUM(price) AS revenue"])
//!     .where_between("collection_date", "2025-01-01", "2025-01-07")
//!     .group_by(&["city"])
//!     .order_by(&["revenue DESC"])
//!     .limit(5)
//!     .build();
//! ```

/// Quote a column or table name as a DuckDB identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds parameterized SQL queries safely.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    is_distinct: bool,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    group_by_cols: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table (quoted as an identifier).
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            is_distinct: false,
            from_table: quote_ident(table),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_cols: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Set the select expressions (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add DISTINCT to the SELECT clause.
    pub fn distinct(&mut self) -> &mut Self {
        self.is_distinct = true;
        self
    }

    /// Add a WHERE condition with `?` placeholders for each param.
    ///
    /// Parameters are appended in order.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add an equality condition: `"{column}" = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} = ?", quote_ident(column)));
        self.params.push(value.to_string());
        self
    }

    /// Add an inclusive range condition: `"{column}" BETWEEN ? AND ?`.
    pub fn where_between(&mut self, column: &str, low: &str, high: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} BETWEEN ? AND ?", quote_ident(column)));
        self.params.push(low.to_string());
        self.params.push(high.to_string());
        self
    }

    /// Exclude rows where `column` is NULL or blank.
    pub fn where_present(&mut self, column: &str) -> &mut Self {
        let col = quote_ident(column);
        self.where_clauses
            .push(format!("{} IS NOT NULL AND TRIM({}) <> ''", col, col));
        self
    }

    /// Exclude rows where `column` is NULL.
    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} IS NOT NULL", quote_ident(column)));
        self
    }

    /// Add GROUP BY expressions.
    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols
            .extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Add ORDER BY clauses (e.g. `"revenue DESC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    ///
    /// Returns a tuple of `(sql_string, params_list)` ready for execution.
    pub fn build(&self) -> (String, Vec<String>) {
        let distinct = if self.is_distinct { "DISTINCT " } else { "" };
        let cols = self.select_cols.join(", ");
        let mut parts = vec![
            format!("SELECT {}{}", distinct, cols),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
