//! Double-dispatch traversal.
//!
//! Every node type implements [`Visitable`]; `accept` calls the matching
//! `Visitor::visit_*` method. The default `visit_*` bodies delegate to the
//! `walk_*` functions, which visit children depth-first and left-to-right in
//! source order. Override a `visit_*` method to intercept a node and call the
//! corresponding `walk_*` from it to keep descending.
//!
//! Clauses are walked in source order, so a FROM-first query visits its FROM
//! clause before its SELECT clause.

use crate::{
    Couple, CreateTable, CteExpression, CteInner, DescStatement, Expr, Field, FieldType,
    FromClause, FromSource, GroupByClause, HavingClause, OrderByClause, Program, Query, QueryOrder,
    SchemaDefinition, SchemaField, SelectClause, SetExpr, SkipClause, Statement, TakeClause,
    WhereClause,
};

pub trait Visitor {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_set_expr(&mut self, set: &SetExpr) {
        walk_set_expr(self, set);
    }

    fn visit_cte(&mut self, cte: &CteExpression) {
        walk_cte(self, cte);
    }

    fn visit_cte_inner(&mut self, inner: &CteInner) {
        walk_cte_inner(self, inner);
    }

    fn visit_query(&mut self, query: &Query) {
        walk_query(self, query);
    }

    fn visit_select(&mut self, select: &SelectClause) {
        walk_select(self, select);
    }

    fn visit_field(&mut self, field: &Field) {
        walk_field(self, field);
    }

    fn visit_from(&mut self, from: &FromClause) {
        walk_from(self, from);
    }

    fn visit_from_source(&mut self, source: &FromSource) {
        walk_from_source(self, source);
    }

    fn visit_where(&mut self, clause: &WhereClause) {
        walk_where(self, clause);
    }

    fn visit_group_by(&mut self, clause: &GroupByClause) {
        walk_group_by(self, clause);
    }

    fn visit_having(&mut self, clause: &HavingClause) {
        walk_having(self, clause);
    }

    fn visit_order_by(&mut self, clause: &OrderByClause) {
        walk_order_by(self, clause);
    }

    fn visit_skip(&mut self, _clause: &SkipClause) {}

    fn visit_take(&mut self, _clause: &TakeClause) {}

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_desc(&mut self, desc: &DescStatement) {
        walk_desc(self, desc);
    }

    fn visit_create_table(&mut self, _table: &CreateTable) {}

    fn visit_couple(&mut self, _couple: &Couple) {}

    fn visit_schema_definition(&mut self, schema: &SchemaDefinition) {
        walk_schema_definition(self, schema);
    }

    fn visit_schema_field(&mut self, field: &SchemaField) {
        walk_schema_field(self, field);
    }
}

/// Entry point for double dispatch.
pub trait Visitable {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V);
}

macro_rules! visitable {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl Visitable for $ty {
                fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
                    visitor.$method(self);
                }
            }
        )*
    };
}

visitable! {
    Program => visit_program,
    Statement => visit_statement,
    SetExpr => visit_set_expr,
    CteExpression => visit_cte,
    CteInner => visit_cte_inner,
    Query => visit_query,
    SelectClause => visit_select,
    Field => visit_field,
    FromClause => visit_from,
    FromSource => visit_from_source,
    WhereClause => visit_where,
    GroupByClause => visit_group_by,
    HavingClause => visit_having,
    OrderByClause => visit_order_by,
    SkipClause => visit_skip,
    TakeClause => visit_take,
    Expr => visit_expr,
    DescStatement => visit_desc,
    CreateTable => visit_create_table,
    Couple => visit_couple,
    SchemaDefinition => visit_schema_definition,
    SchemaField => visit_schema_field,
}

// ---------------------------------------------------------------------------
// Walkers
// ---------------------------------------------------------------------------

pub fn walk_program<V: Visitor + ?Sized>(visitor: &mut V, program: &Program) {
    for statement in &program.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Query(set) => visitor.visit_set_expr(set),
        Statement::Cte(cte) => visitor.visit_cte(cte),
        Statement::Desc(desc) => visitor.visit_desc(desc),
        Statement::CreateTable(table) => visitor.visit_create_table(table),
        Statement::Couple(couple) => visitor.visit_couple(couple),
        Statement::SchemaDefinition(schema) => visitor.visit_schema_definition(schema),
    }
}

pub fn walk_set_expr<V: Visitor + ?Sized>(visitor: &mut V, set: &SetExpr) {
    match set {
        SetExpr::Single(query) => visitor.visit_query(query),
        SetExpr::Operation(op) => {
            visitor.visit_set_expr(&op.left);
            visitor.visit_set_expr(&op.right);
        }
    }
}

pub fn walk_cte<V: Visitor + ?Sized>(visitor: &mut V, cte: &CteExpression) {
    for inner in &cte.inner {
        visitor.visit_cte_inner(inner);
    }
    visitor.visit_set_expr(&cte.outer);
}

pub fn walk_cte_inner<V: Visitor + ?Sized>(visitor: &mut V, inner: &CteInner) {
    visitor.visit_set_expr(&inner.value);
}

pub fn walk_query<V: Visitor + ?Sized>(visitor: &mut V, query: &Query) {
    if query.order == QueryOrder::SelectFirst {
        visitor.visit_select(&query.select);
    }
    visitor.visit_from(&query.from);
    if let Some(clause) = &query.where_clause {
        visitor.visit_where(clause);
    }
    if let Some(clause) = &query.group_by {
        visitor.visit_group_by(clause);
    }
    if query.order == QueryOrder::FromFirst {
        visitor.visit_select(&query.select);
    }
    if let Some(clause) = &query.order_by {
        visitor.visit_order_by(clause);
    }
    if let Some(clause) = &query.skip {
        visitor.visit_skip(clause);
    }
    if let Some(clause) = &query.take {
        visitor.visit_take(clause);
    }
}

pub fn walk_select<V: Visitor + ?Sized>(visitor: &mut V, select: &SelectClause) {
    for field in &select.fields {
        visitor.visit_field(field);
    }
}

pub fn walk_field<V: Visitor + ?Sized>(visitor: &mut V, field: &Field) {
    visitor.visit_expr(&field.expression);
}

pub fn walk_from<V: Visitor + ?Sized>(visitor: &mut V, from: &FromClause) {
    visitor.visit_from_source(&from.source);
}

pub fn walk_from_source<V: Visitor + ?Sized>(visitor: &mut V, source: &FromSource) {
    match source {
        FromSource::Schema(s) => walk_exprs(visitor, &s.args),
        FromSource::Function(s) => walk_exprs(visitor, &s.args),
        FromSource::AliasMethod(s) => walk_exprs(visitor, &s.args),
        FromSource::PropertyChain(_) | FromSource::Named(_) => {}
        FromSource::Join(join) | FromSource::Joins(join) => {
            visitor.visit_from_source(&join.left);
            visitor.visit_from_source(&join.right);
            visitor.visit_expr(&join.condition);
        }
        FromSource::Apply(apply) | FromSource::Applies(apply) => {
            visitor.visit_from_source(&apply.left);
            visitor.visit_from_source(&apply.right);
        }
    }
}

pub fn walk_where<V: Visitor + ?Sized>(visitor: &mut V, clause: &WhereClause) {
    visitor.visit_expr(&clause.expression);
}

pub fn walk_group_by<V: Visitor + ?Sized>(visitor: &mut V, clause: &GroupByClause) {
    for field in &clause.fields {
        visitor.visit_field(field);
    }
    if let Some(having) = &clause.having {
        visitor.visit_having(having);
    }
}

pub fn walk_having<V: Visitor + ?Sized>(visitor: &mut V, clause: &HavingClause) {
    visitor.visit_expr(&clause.expression);
}

pub fn walk_order_by<V: Visitor + ?Sized>(visitor: &mut V, clause: &OrderByClause) {
    for order in &clause.fields {
        visitor.visit_field(&order.field);
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::Literal(..)
        | Expr::Column { .. }
        | Expr::Property { .. }
        | Expr::ArrayIndex { .. }
        | Expr::FieldLink { .. }
        | Expr::AllColumns { .. } => {}
        Expr::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        Expr::Not { expr, .. } | Expr::Negate { expr, .. } | Expr::IsNull { expr, .. } => {
            visitor.visit_expr(expr);
        }
        Expr::In { expr, values, .. } | Expr::Contains { expr, values, .. } => {
            visitor.visit_expr(expr);
            walk_exprs(visitor, values);
        }
        Expr::Case {
            when_then,
            else_expr,
            ..
        } => {
            for (when, then) in when_then {
                visitor.visit_expr(when);
                visitor.visit_expr(then);
            }
            visitor.visit_expr(else_expr);
        }
        Expr::MethodCall { args, .. } => walk_exprs(visitor, args),
        Expr::KeyAccess { key, .. } => visitor.visit_expr(key),
        Expr::Dot {
            root, expression, ..
        } => {
            visitor.visit_expr(root);
            visitor.visit_expr(expression);
        }
    }
}

pub fn walk_desc<V: Visitor + ?Sized>(visitor: &mut V, desc: &DescStatement) {
    if let Some(args) = &desc.args {
        walk_exprs(visitor, args);
    }
}

pub fn walk_schema_definition<V: Visitor + ?Sized>(visitor: &mut V, schema: &SchemaDefinition) {
    for field in &schema.fields {
        visitor.visit_schema_field(field);
    }
}

pub fn walk_schema_field<V: Visitor + ?Sized>(visitor: &mut V, field: &SchemaField) {
    walk_field_type(visitor, &field.ty);
}

fn walk_field_type<V: Visitor + ?Sized>(visitor: &mut V, ty: &FieldType) {
    match ty {
        FieldType::Array { element, length } => {
            walk_field_type(visitor, element);
            visitor.visit_expr(length);
        }
        FieldType::String { length, .. } => visitor.visit_expr(length),
        FieldType::Primitive { .. } | FieldType::Reference(_) | FieldType::Text { .. } => {}
    }
}

fn walk_exprs<V: Visitor + ?Sized>(visitor: &mut V, exprs: &[Expr]) {
    for expr in exprs {
        visitor.visit_expr(expr);
    }
}
