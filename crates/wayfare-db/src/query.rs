//! SQL rendering for location searches.
//!
//! Turns the query values built in `wayfare-search` into a parameterised
//! `WHERE` clause, a `matchScore` `CASE` expression and the shared ordering.
//! Every user-supplied value is bound as a parameter; only column names and
//! constants are interpolated.
//!
//! ```rust,ignore
//! let query = LocationQuery::new().filter(&filter).regex(&regex_query);
//! let count_sql = query.count_sql();
//! let (page_sql, params) = query.page_sql(page);
//! ```

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;
use uuid::Uuid;

use wayfare_core::{
    LocationFilter, LocationType, PageRequest, RegexQuery, ScoreSpec, SearchField, TextQuery,
};
use wayfare_core::defaults::{SCORE_EXACT, SCORE_NONE, SCORE_PREFIX};

/// Columns selected for every location row, in table order.
pub const LOCATION_COLUMNS: &str = "id, name, en_name, pinyin, code, \"type\", status, parent_id, \
    city, province, district, county, country, country_code, latitude, longitude, timezone, \
    risk_level, no_airport, city_level, ctrip_city_id, continent_id, remark, created_at, updated_at";

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Uuid(Uuid),
    UuidArray(Vec<Uuid>),
    String(String),
    BigInt(i64),
    Int(i32),
    SmallInt(i16),
    Double(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// `CASE` expression mapping `type` to its hierarchical rank.
pub fn type_rank_sql() -> String {
    let arms: Vec<String> = LocationType::ALL
        .iter()
        .map(|t| format!("WHEN '{}' THEN {}", t.as_str(), t.rank()))
        .collect();
    format!("CASE \"type\" {} ELSE {} END", arms.join(" "), LocationType::ALL.len())
}

/// `ORDER BY` list for unscored location lists.
pub fn location_order_sql() -> String {
    format!("{}, name COLLATE \"C\", id", type_rank_sql())
}

/// Accumulates conditions and parameters for one location query.
#[derive(Debug, Clone, Default)]
pub struct LocationQuery {
    conditions: Vec<String>,
    score: Option<ScoreSpec>,
    params: Vec<QueryParam>,
}

impl LocationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a parameter and return its placeholder.
    fn bind(&mut self, param: QueryParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    /// Add the non-search filters.
    pub fn filter(mut self, filter: &LocationFilter) -> Self {
        if let Some(status) = filter.status {
            let p = self.bind(QueryParam::String(status.as_str().to_string()));
            self.conditions.push(format!("status = {}", p));
        }
        if let Some(location_type) = filter.location_type {
            let p = self.bind(QueryParam::String(location_type.as_str().to_string()));
            self.conditions.push(format!("\"type\" = {}", p));
        }
        if let Some(city) = filter.city.as_deref() {
            let p = self.bind(QueryParam::String(format!("%{}%", escape_like(city))));
            self.conditions.push(format!("city ILIKE {}", p));
        }
        if let Some(country) = filter.country.as_deref() {
            let p = self.bind(QueryParam::String(format!("%{}%", escape_like(country))));
            self.conditions.push(format!("country ILIKE {}", p));
        }
        self
    }

    /// Match against the weighted text index.
    pub fn text(mut self, query: &TextQuery) -> Self {
        let p = self.bind(QueryParam::String(query.search.clone()));
        self.conditions.push(format!(
            "search_tsv @@ plainto_tsquery('{}', {})",
            query.language, p
        ));
        self
    }

    /// Match the regex clauses (as one disjunction) and score by the query's spec.
    pub fn regex(mut self, query: &RegexQuery) -> Self {
        if query.clauses.is_empty() {
            self.conditions.push("FALSE".to_string());
        } else {
            let mut disjuncts = Vec::with_capacity(query.clauses.len());
            for clause in &query.clauses {
                let pattern = self.bind(QueryParam::String(clause.pattern()));
                let mut sql = format!("{} ~* {}", clause.field.column(), pattern);
                if let Some(status) = clause.status {
                    let p = self.bind(QueryParam::String(status.as_str().to_string()));
                    sql = format!("({} AND status = {})", sql, p);
                }
                disjuncts.push(sql);
            }
            self.conditions.push(format!("({})", disjuncts.join(" OR ")));
        }
        self.score(&query.score)
    }

    /// Rank rows by `match_score` for the given term and fields.
    pub fn score(mut self, spec: &ScoreSpec) -> Self {
        let term = spec.term.trim().to_lowercase();
        self.score = if term.is_empty() || spec.fields.is_empty() {
            None
        } else {
            Some(ScoreSpec {
                term,
                fields: spec.fields.clone(),
            })
        };
        self
    }

    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    /// Parameters referenced by [`where_sql`](Self::where_sql) and [`count_sql`](Self::count_sql).
    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    /// `COUNT(*)` over the same conditions; binds [`params`](Self::params).
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM location WHERE {}", self.where_sql())
    }

    /// One ordered page of rows with `match_score`; returns the SQL and all parameters.
    ///
    /// The score term, limit and offset are bound after the filter parameters.
    pub fn page_sql(&self, page: PageRequest) -> (String, Vec<QueryParam>) {
        let mut params = self.params.clone();

        let score_sql = match &self.score {
            Some(spec) => {
                params.push(QueryParam::String(spec.term.clone()));
                score_case_sql(&spec.fields, params.len())
            }
            None => SCORE_NONE.to_string(),
        };

        params.push(QueryParam::BigInt(i64::from(page.limit)));
        let limit = params.len();
        params.push(QueryParam::BigInt(page.offset()));
        let offset = params.len();

        let sql = format!(
            "SELECT {}, ({})::int AS match_score FROM location WHERE {} \
             ORDER BY match_score DESC, {} LIMIT ${} OFFSET ${}",
            LOCATION_COLUMNS,
            score_sql,
            self.where_sql(),
            location_order_sql(),
            limit,
            offset
        );
        (sql, params)
    }
}

/// `CASE` expression for `match_score`, comparing against the lower-cased term at `$term_param`.
pub fn score_case_sql(fields: &[SearchField], term_param: usize) -> String {
    let exact: Vec<String> = fields
        .iter()
        .map(|f| format!("lower({}) = ${}", f.column(), term_param))
        .collect();
    let prefix: Vec<String> = fields
        .iter()
        .map(|f| format!("starts_with(lower({}), ${})", f.column(), term_param))
        .collect();
    format!(
        "CASE WHEN {} THEN {} WHEN {} THEN {} ELSE {} END",
        exact.join(" OR "),
        SCORE_EXACT,
        prefix.join(" OR "),
        SCORE_PREFIX,
        SCORE_NONE
    )
}

/// `SET` list for a partial update. Only present fields are written and
/// `$1` is always the row id.
#[derive(Debug, Clone)]
pub struct UpdateSet {
    assignments: Vec<String>,
    params: Vec<QueryParam>,
}

impl UpdateSet {
    pub fn new(id: Uuid) -> Self {
        Self {
            assignments: Vec::new(),
            params: vec![QueryParam::Uuid(id)],
        }
    }

    /// Assign `column` when a value is present.
    pub fn set(&mut self, column: &str, value: Option<QueryParam>) -> &mut Self {
        if let Some(param) = value {
            self.params.push(param);
            self.assignments
                .push(format!("{} = ${}", column, self.params.len()));
        }
        self
    }

    /// Assign or clear a nullable column; `Some(None)` writes `NULL`.
    pub fn set_nullable(&mut self, column: &str, value: Option<Option<QueryParam>>) -> &mut Self {
        match value {
            Some(Some(param)) => self.set(column, Some(param)),
            Some(None) => {
                self.assignments.push(format!("{} = NULL", column));
                self
            }
            None => self,
        }
    }

    /// Render `UPDATE .. RETURNING ..`, stamping `updated_at`.
    pub fn into_sql(
        mut self,
        table: &str,
        returning: &str,
        now: DateTime<Utc>,
    ) -> (String, Vec<QueryParam>) {
        self.set("updated_at", Some(QueryParam::Timestamp(now)));
        let sql = format!(
            "UPDATE {} SET {} WHERE id = $1 RETURNING {}",
            table,
            self.assignments.join(", "),
            returning
        );
        (sql, self.params)
    }
}

/// Text value for [`UpdateSet::set_nullable`].
pub fn nullable_text(value: Option<Option<String>>) -> Option<Option<QueryParam>> {
    value.map(|v| v.map(QueryParam::String))
}

/// Bind parameters to a query in order.
pub(crate) fn bind_params<'q>(
    mut q: Query<'q, Postgres, PgArguments>,
    params: &'q [QueryParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        q = match param {
            QueryParam::Uuid(id) => q.bind(id),
            QueryParam::UuidArray(ids) => q.bind(ids),
            QueryParam::String(s) => q.bind(s),
            QueryParam::BigInt(n) => q.bind(n),
            QueryParam::Int(n) => q.bind(n),
            QueryParam::SmallInt(n) => q.bind(n),
            QueryParam::Double(n) => q.bind(n),
            QueryParam::Bool(b) => q.bind(b),
            QueryParam::Timestamp(t) => q.bind(t),
        };
    }
    q
}
