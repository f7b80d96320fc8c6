use crate::db::{BoundKind, SqlValue};

/// A SQL predicate with anonymous `?` placeholders and the values bound to them.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub clause: String,
    pub params: Vec<SqlValue>,
}

/// SQL text plus its positional parameters, in placeholder order.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// The caller's filtered row set, treated as an opaque subquery source.
///
/// `source` is a table name or a join clause. Like the histogram column it is
/// spliced into SQL as-is and must come from a trusted caller; filter values
/// are always bound as parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RowSet {
    source: String,
    filters: Vec<Filter>,
    order_by: Vec<String>,
}

impl RowSet {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            filters: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Adds a predicate; all predicates are ANDed together.
    pub fn filter<I>(mut self, clause: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        self.filters.push(Filter {
            clause: clause.into(),
            params: params.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn order_by(mut self, expression: impl Into<String>) -> Self {
        self.order_by.push(expression.into());
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &[String] {
        &self.order_by
    }

    /// ` FROM <source> WHERE ...` and the filter params.
    fn from_where(&self, extra: Option<&str>) -> (String, Vec<SqlValue>) {
        let mut sql = format!(" FROM {}", self.source);
        let mut clauses = self
            .filters
            .iter()
            .map(|f| format!("({})", f.clause))
            .collect::<Vec<_>>();
        if let Some(extra) = extra {
            clauses.push(extra.to_owned());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        let params = self
            .filters
            .iter()
            .flat_map(|f| f.params.iter().cloned())
            .collect();
        (sql, params)
    }

    /// `SELECT <selected>` over the row set with the caller's ordering replaced
    /// by `ORDER BY 1`, so it can be grouped by an outer query.
    pub fn subquery(&self, selected: &str) -> Statement {
        let (from_where, params) = self.from_where(None);
        Statement {
            sql: format!("SELECT {selected}{from_where} ORDER BY 1"),
            params,
        }
    }

    pub fn bound_statement(&self, expression: &str, kind: BoundKind) -> Statement {
        let (from_where, params) = self.from_where(None);
        Statement {
            sql: format!("SELECT {}({expression}){from_where}", kind.sql_function()),
            params,
        }
    }

    pub fn bounds_statement(&self, expression: &str) -> Statement {
        let (from_where, params) = self.from_where(None);
        Statement {
            sql: format!("SELECT MIN({expression}), MAX({expression}){from_where}"),
            params,
        }
    }

    pub fn equality_count_statement(&self, expression: &str, value: f64) -> Statement {
        let (from_where, mut params) = self.from_where(Some(&format!("({expression}) = ?")));
        params.push(SqlValue::Real(value));
        Statement {
            sql: format!("SELECT COUNT(*){from_where}"),
            params,
        }
    }
}
