mod aql;
mod sql;
mod viz;

pub use viz::{ColumnMeta, ColumnSemantic, VizKind, VizMeta, VizSuggestion};

use crate::{
    ast::{
        Condition, FieldRef, LogicalOp, Operator, OrderDirection, PageDirection, Pagination,
        Predicate, Query, QueryKind, Value,
    },
    bind::{bind, bind_list, BindParam, ParamType},
    config::AppConfig,
    dialect::{Backend, DialectTable, FunctionRewrite, StatementShape},
    error::{Result, ServiceError, TranslationError},
    pagination::{self, PaginationOutcome},
    parser,
    schema::{self, ColumnType},
    time::{keyword_date_string, Clock},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};
use tracing::debug;

/// Everything the executor needs to run a compiled query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub statement: String,
    /// Always empty in literal mode.
    pub params: Vec<BindParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viz: Option<VizMeta>,
    pub pagination: PaginationOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Values travel as positional placeholders plus typed params.
    #[default]
    Parameterized,
    /// Values are embedded in the statement. Never execute these against a live backend.
    Literal,
}

impl TranslationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TranslationMode::Parameterized => "parameterized",
            TranslationMode::Literal => "literal",
        }
    }
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationMode {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "safe" | "parameterized" | "params" => Ok(TranslationMode::Parameterized),
            "literal" | "embedded" => Ok(TranslationMode::Literal),
            other => Err(format!("unsupported translation mode '{other}'")),
        }
    }
}

/// Parameterized translation, the mode every executed statement must use.
pub fn translate(
    query: &Query,
    backend: Backend,
    clock: &dyn Clock,
) -> std::result::Result<Artifact, TranslationError> {
    translate_with_mode(query, backend, TranslationMode::Parameterized, clock)
}

/// Literal-embedding translation for display and tests.
pub fn translate_literal(
    query: &Query,
    backend: Backend,
    clock: &dyn Clock,
) -> std::result::Result<Artifact, TranslationError> {
    translate_with_mode(query, backend, TranslationMode::Literal, clock)
}

pub fn translate_with_mode(
    query: &Query,
    backend: Backend,
    mode: TranslationMode,
    clock: &dyn Clock,
) -> std::result::Result<Artifact, TranslationError> {
    let dialect = backend.dialect();
    let source = dialect
        .storage_object(query.entity)
        .ok_or_else(|| TranslationError::UnsupportedEntity {
            entity: query.entity.to_string(),
            backend,
        })?;

    // Aggregates return one row; ordering and paging do not apply.
    let (limit, page) = match query.kind {
        QueryKind::Show => (query.limit, query.pagination.as_ref()),
        QueryKind::Count => (None, None),
    };
    let offset = pagination::offset_for(page, limit)?;

    let mut emitter = Emitter {
        dialect,
        query,
        mode,
        clock,
        params: Vec::new(),
    };
    let filter = emitter.filter()?;
    let order = match query.kind {
        QueryKind::Show => emitter.order()?,
        QueryKind::Count => Vec::new(),
    };

    let clauses = Clauses {
        kind: query.kind,
        source,
        filter,
        order,
        limit,
        offset,
    };
    let statement = match dialect.shape {
        StatementShape::Sql { count_projection } => sql::assemble(&clauses, count_projection),
        StatementShape::Document {
            variable,
            separator,
        } => aql::assemble(&clauses, variable, separator),
    };

    Ok(Artifact {
        statement,
        params: emitter.params,
        viz: Some(viz::meta_for(query)),
        pagination: pagination::pending(page, limit),
    })
}

/// Backend-independent pieces of a statement, already rendered.
pub(crate) struct Clauses<'a> {
    pub kind: QueryKind,
    pub source: &'a str,
    pub filter: Option<String>,
    pub order: Vec<String>,
    pub limit: Option<u64>,
    pub offset: u64,
}

struct RenderedField {
    expr: String,
    column_type: Option<ColumnType>,
    /// The expression is a prefix of a raw timestamp, so date keywords must be literal dates.
    date_prefix: bool,
}

struct Emitter<'a> {
    dialect: &'static DialectTable,
    query: &'a Query,
    mode: TranslationMode,
    clock: &'a dyn Clock,
    params: Vec<BindParam>,
}

impl Emitter<'_> {
    fn filter(&mut self) -> std::result::Result<Option<String>, TranslationError> {
        let conditions = &self.query.conditions;
        if conditions.is_empty() {
            return Ok(None);
        }
        self.chain(conditions).map(Some)
    }

    /// Renders one condition chain; groups recurse and come back parenthesised.
    fn chain(
        &mut self,
        conditions: &[Condition],
    ) -> std::result::Result<String, TranslationError> {
        let mut rendered = String::new();
        for condition in conditions {
            match condition.logical_op {
                LogicalOp::None => {}
                LogicalOp::And => {
                    rendered.push(' ');
                    rendered.push_str(self.dialect.and_keyword);
                    rendered.push(' ');
                }
                LogicalOp::Or => {
                    rendered.push(' ');
                    rendered.push_str(self.dialect.or_keyword);
                    rendered.push(' ');
                }
            }
            match &condition.predicate {
                Predicate::Compare(comparison) => {
                    let predicate = self.predicate(
                        &comparison.field,
                        comparison.operator,
                        &comparison.value,
                    )?;
                    rendered.push_str(&predicate);
                }
                Predicate::Group { conditions } => {
                    rendered.push('(');
                    rendered.push_str(&self.chain(conditions)?);
                    rendered.push(')');
                }
            }
        }
        Ok(rendered)
    }

    fn order(&self) -> std::result::Result<Vec<String>, TranslationError> {
        self.query
            .order_by
            .iter()
            .map(|clause| {
                let field = self.field(&clause.field)?;
                let direction = match clause.direction {
                    OrderDirection::Asc => "ASC",
                    OrderDirection::Desc => "DESC",
                };
                Ok(format!("{} {direction}", field.expr))
            })
            .collect()
    }

    fn field(&self, raw: &str) -> std::result::Result<RenderedField, TranslationError> {
        let field = FieldRef::parse(raw);
        let entity = self.query.entity;

        let Some(function) = field.function else {
            return Ok(RenderedField {
                expr: self.dialect.column(raw),
                column_type: schema::column_type(entity, raw),
                date_prefix: false,
            });
        };

        let unsupported = || TranslationError::UnsupportedFunction {
            function: function.to_string(),
            backend: self.dialect.backend,
        };
        let rewrite = self.dialect.function(function).ok_or_else(unsupported)?;
        let column_type = match function {
            "date" => Some(ColumnType::Date),
            "lower" | "upper" => Some(ColumnType::Text),
            _ => None,
        };

        match rewrite {
            FunctionRewrite::Call(name) => {
                let args: Vec<String> = field
                    .args
                    .iter()
                    .map(|arg| self.dialect.column(arg))
                    .collect();
                Ok(RenderedField {
                    expr: format!("{name}({})", args.join(", ")),
                    column_type,
                    date_prefix: false,
                })
            }
            FunctionRewrite::DatePrefix {
                function,
                start,
                len,
            } => {
                if field.args.len() != 1 {
                    return Err(unsupported());
                }
                let column = self.dialect.column(field.column());
                Ok(RenderedField {
                    expr: format!("{function}({column}, {start}, {len})"),
                    column_type,
                    date_prefix: true,
                })
            }
        }
    }

    fn predicate(
        &mut self,
        raw_field: &str,
        op: Operator,
        value: &Value,
    ) -> std::result::Result<String, TranslationError> {
        let field = self.field(raw_field)?;
        self.check_literal(raw_field, op, value, field.column_type)?;
        let dialect = self.dialect;

        let rendered = match (op, value) {
            (Operator::IsNull, _) => (dialect.is_null)(&field.expr),
            (Operator::IsNotNull, _) => (dialect.is_not_null)(&field.expr),
            (Operator::Like, _) => {
                let pattern = self.scalar(value, &field, None)?;
                (dialect.like)(&field.expr, &pattern)
            }
            (Operator::Contains, _) => {
                let needle = self.scalar(value, &field, None)?;
                (dialect.contains)(&field.expr, &needle)
            }
            (Operator::In, Value::List(_)) => {
                let list = self.emit(bind_list(value, field.column_type)?);
                (dialect.in_list)(&field.expr, &list)
            }
            (Operator::Between, Value::List(bounds)) if bounds.len() == 2 => {
                let (low, high) = (&bounds[0], &bounds[1]);
                let widened = matches!(low, Value::Float(_)) || matches!(high, Value::Float(_));
                let forced = widened.then_some(ParamType::Float);
                let low = self.scalar(low, &field, forced)?;
                let high = self.scalar(high, &field, forced)?;
                (dialect.between)(&field.expr, &low, &high)
            }
            (Operator::In | Operator::Between, _) => {
                return Err(invalid(raw_field, op, "expected a list of values"))
            }
            (op, _) => {
                let symbol = dialect
                    .comparison(op)
                    .ok_or_else(|| invalid(raw_field, op, "operator has no comparison form"))?;
                let rendered = self.scalar(value, &field, None)?;
                format!("{} {symbol} {rendered}", field.expr)
            }
        };
        Ok(rendered)
    }

    /// Rejects operator/literal pairings before anything is emitted.
    fn check_literal(
        &self,
        raw_field: &str,
        op: Operator,
        value: &Value,
        column_type: Option<ColumnType>,
    ) -> std::result::Result<(), TranslationError> {
        let scalars: &[Value] = match value {
            Value::List(items) => items,
            other => std::slice::from_ref(other),
        };

        match op {
            Operator::Like | Operator::Contains => {
                if !matches!(value, Value::String(_)) {
                    return Err(invalid(raw_field, op, "pattern must be a string literal"));
                }
            }
            op if op.is_ordering() => {
                if scalars.iter().any(|v| matches!(v, Value::Bool(_))) {
                    return Err(invalid(raw_field, op, "booleans cannot be ordered"));
                }
            }
            _ => {}
        }

        let Some(column_type) = column_type.filter(|_| self.dialect.strict_types) else {
            return Ok(());
        };
        if matches!(op, Operator::IsNull | Operator::IsNotNull) {
            return Ok(());
        }

        let expected = column_type.element();
        for scalar in scalars {
            let agrees = match (expected, scalar) {
                (ColumnType::Text, Value::String(_)) => true,
                (ColumnType::Bool, Value::Bool(_)) => true,
                (ColumnType::Int, Value::Int(_)) => true,
                (ColumnType::Float, Value::Int(_) | Value::Float(_)) => true,
                (
                    ColumnType::Timestamptz | ColumnType::Date,
                    Value::String(_) | Value::Keyword(_),
                ) => true,
                _ => false,
            };
            if !agrees {
                return Err(invalid(
                    raw_field,
                    op,
                    &format!(
                        "{} column cannot be compared with a {} literal",
                        column_type.as_str(),
                        scalar.type_name()
                    ),
                ));
            }
        }
        Ok(())
    }

    fn scalar(
        &mut self,
        value: &Value,
        field: &RenderedField,
        forced: Option<ParamType>,
    ) -> std::result::Result<String, TranslationError> {
        if let Value::Keyword(keyword) = value {
            if !field.date_prefix {
                if let Some(native) = self.dialect.date_keyword(*keyword) {
                    return Ok(native.to_string());
                }
            }
            let date = keyword_date_string(*keyword, self.clock);
            return Ok(self.emit(BindParam::Text(date)));
        }

        let ty = match forced {
            Some(ty) => ty,
            None => ParamType::infer(value, field.column_type)?,
        };
        Ok(self.emit(bind(value, ty)?))
    }

    /// Returns the text standing in for `param` inside the statement.
    fn emit(&mut self, param: BindParam) -> String {
        match self.mode {
            TranslationMode::Parameterized => {
                self.params.push(param);
                self.dialect.placeholder(self.params.len())
            }
            TranslationMode::Literal => self.literal(&param),
        }
    }

    fn literal(&self, param: &BindParam) -> String {
        let dialect = self.dialect;
        match param {
            BindParam::Text(text) | BindParam::Timestamptz(text) => dialect.quote_string(text),
            BindParam::Bool(flag) => flag.to_string(),
            BindParam::Int(number) => number.to_string(),
            BindParam::Float(number) => format!("{number:?}"),
            BindParam::TextArray(items) => {
                let quoted: Vec<String> = items.iter().map(|s| dialect.quote_string(s)).collect();
                format!("{}{}{}", dialect.list_open, quoted.join(", "), dialect.list_close)
            }
            BindParam::IntArray(items) => {
                let numbers: Vec<String> = items.iter().map(i64::to_string).collect();
                format!("{}{}{}", dialect.list_open, numbers.join(", "), dialect.list_close)
            }
        }
    }
}

fn invalid(field: &str, op: Operator, reason: &str) -> TranslationError {
    TranslationError::InvalidLiteralForOperator {
        field: field.to_string(),
        operator: op.to_string(),
        reason: reason.to_string(),
    }
}

/// Body of a compile request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub direction: PageDirection,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub backend: Option<Backend>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: None,
            cursor: None,
            direction: PageDirection::Next,
            mode: None,
            backend: None,
        }
    }
}

/// Compiler entry point: query text plus request options in, artifact out.
pub fn translate_request(
    config: &AppConfig,
    request: QueryRequest,
    clock: &dyn Clock,
) -> Result<Artifact> {
    let mut query = parser::parse(&request.query)?;
    let backend = request.backend.unwrap_or(config.backend);
    let mode = match request.mode.as_deref() {
        Some(raw) => raw
            .parse::<TranslationMode>()
            .map_err(ServiceError::InvalidRequest)?,
        None => config.default_mode,
    };

    if let Some(limit) = request.limit {
        let limit = u64::try_from(limit)
            .map_err(|_| ServiceError::InvalidRequest("limit must be non-negative".into()))?;
        query.limit = Some(limit);
    }
    query.limit = determine_limit(config, query.limit);

    if let Some(cursor) = request.cursor.filter(|c| !c.trim().is_empty()) {
        query.pagination = Some(Pagination {
            cursor,
            direction: request.direction,
            mode: request.mode,
        });
    }

    let artifact = translate_with_mode(&query, backend, mode, clock)?;
    debug!(
        %backend,
        %mode,
        entity = %query.entity,
        params = artifact.params.len(),
        "translated SRQL query"
    );
    Ok(artifact)
}

fn determine_limit(config: &AppConfig, candidate: Option<u64>) -> Option<u64> {
    match (candidate, config.max_limit) {
        (Some(limit), Some(max)) => Some(limit.min(max)),
        (limit, _) => limit,
    }
}

#[derive(Clone)]
pub struct QueryEngine {
    config: Arc<AppConfig>,
    clock: Arc<dyn Clock>,
}

impl QueryEngine {
    pub fn with_clock(config: Arc<AppConfig>, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn translate(&self, request: QueryRequest) -> Result<Artifact> {
        translate_request(&self.config, request, self.clock.as_ref())
    }
}
