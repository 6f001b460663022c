//! SeaORM adapter for the score store.
//!
//! `scores` and `scores_relax` share one schema, so statements are built with
//! sea-query against the table chosen by the ruleset.

use async_trait::async_trait;
use sea_orm::sea_query::{
    Alias, Cond, Expr, Func, JoinType, Order, Query, SelectStatement, SimpleExpr,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, FromQueryResult};

use crate::domain::{privileges, ScoreRow};
use crate::entities::{users, users_relationships, users_stats};
use crate::errors::domain::DomainError;
use crate::repos::scores::{ScoreFilter, ScoreQuery, ScoreStore};

pub mod dto;

pub use dto::{CountDto, ScoreRowDto};

/// `scores.completed` value of a player's best pass on a map.
const COMPLETED_BEST: i32 = 3;

fn s(column: &'static str) -> (Alias, Alias) {
    (Alias::new("s"), Alias::new(column))
}

fn a(column: users::Column) -> (Alias, users::Column) {
    (Alias::new("a"), column)
}

/// Map + mode + visibility + scope conditions shared by every score query.
fn base_condition(query: &ScoreQuery) -> Cond {
    let public = Expr::cust(format!("a.privileges & {} > 0", privileges::USER_PUBLIC));
    let cond = Cond::all()
        .add(public)
        .add(Expr::col(s("beatmap_md5")).eq(query.map_hash.as_str()))
        .add(Expr::col(s("play_mode")).eq(query.ruleset.mode().id()))
        .add(Expr::col(s("completed")).eq(COMPLETED_BEST));

    match &query.filter {
        ScoreFilter::All => cond,
        ScoreFilter::Mods(mods) => cond.add(Expr::col(s("mods")).eq(i64::from(*mods))),
        ScoreFilter::Friends(user_id) => cond.add(friends_of(*user_id)),
        ScoreFilter::Country(code) => cond.add(
            Expr::col(s("userid")).in_subquery(
                Query::select()
                    .column(users_stats::Column::Id)
                    .from(users_stats::Entity)
                    .and_where(Expr::col(users_stats::Column::Country).eq(code.as_str()))
                    .to_owned(),
            ),
        ),
    }
}

fn friends_of(user_id: i64) -> Cond {
    Cond::any()
        .add(Expr::col(s("userid")).eq(user_id))
        .add(
            Expr::col(s("userid")).in_subquery(
                Query::select()
                    .column(users_relationships::Column::User2)
                    .from(users_relationships::Entity)
                    .and_where(Expr::col(users_relationships::Column::User1).eq(user_id))
                    .to_owned(),
            ),
        )
}

/// `FROM <table> s INNER JOIN users a ON s.userid = a.id WHERE ...`
fn scoped_from(query: &ScoreQuery, cond: Cond) -> SelectStatement {
    Query::select()
        .from_as(Alias::new(query.ruleset.scores_table()), Alias::new("s"))
        .join_as(
            JoinType::InnerJoin,
            users::Entity,
            Alias::new("a"),
            Expr::col(s("userid")).equals(a(users::Column::Id)),
        )
        .cond_where(cond)
        .to_owned()
}

fn row_columns(select: &mut SelectStatement) {
    let columns: [(&'static str, &'static str); 13] = [
        ("id", "id"),
        ("score", "score"),
        ("pp", "pp"),
        ("max_combo", "max_combo"),
        ("50_count", "count_50"),
        ("100_count", "count_100"),
        ("300_count", "count_300"),
        ("gekis_count", "count_geki"),
        ("katus_count", "count_katu"),
        ("misses_count", "count_miss"),
        ("full_combo", "full_combo"),
        ("mods", "mods"),
        ("time", "time"),
    ];
    for (column, alias) in columns {
        select.expr_as(Expr::col(s(column)), Alias::new(alias));
    }
    select
        .expr_as(Expr::col(a(users::Column::Username)), Alias::new("username"))
        .expr_as(Expr::col(a(users::Column::Id)), Alias::new("user_id"));
}

fn ordered(select: &mut SelectStatement, query: &ScoreQuery) {
    select
        .order_by(s(query.order.column()), Order::Desc)
        .order_by(s("id"), Order::Asc);
}

fn count_expr() -> SimpleExpr {
    Func::count(Expr::col(s("id"))).into()
}

pub async fn find_page<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    query: &ScoreQuery,
    limit: usize,
) -> Result<Vec<ScoreRowDto>, DbErr> {
    let mut select = scoped_from(query, base_condition(query));
    row_columns(&mut select);
    ordered(&mut select, query);
    select.limit(limit as u64);

    let stmt = conn.get_database_backend().build(&select);
    ScoreRowDto::find_by_statement(stmt).all(conn).await
}

pub async fn count_page<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    query: &ScoreQuery,
) -> Result<i64, DbErr> {
    let mut select = scoped_from(query, base_condition(query));
    select.expr_as(count_expr(), Alias::new("total"));
    fetch_count(conn, &select).await
}

pub async fn find_user_best<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    query: &ScoreQuery,
    user_id: i64,
) -> Result<Option<ScoreRowDto>, DbErr> {
    let cond = base_condition(query).add(Expr::col(a(users::Column::Id)).eq(user_id));
    let mut select = scoped_from(query, cond);
    row_columns(&mut select);
    ordered(&mut select, query);
    select.limit(1);

    let stmt = conn.get_database_backend().build(&select);
    ScoreRowDto::find_by_statement(stmt).one(conn).await
}

pub async fn count_above<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    query: &ScoreQuery,
    value: f64,
) -> Result<i64, DbErr> {
    let cond = base_condition(query).add(Expr::col(s(query.order.column())).gt(value));
    let mut select = scoped_from(query, cond);
    select.expr_as(count_expr(), Alias::new("total"));
    fetch_count(conn, &select).await
}

async fn fetch_count<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    select: &SelectStatement,
) -> Result<i64, DbErr> {
    let stmt = conn.get_database_backend().build(select);
    let row = CountDto::find_by_statement(stmt).one(conn).await?;
    Ok(row.map(|r| r.total).unwrap_or(0))
}

fn non_negative(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

/// `ScoreStore` over the score database.
#[derive(Clone)]
pub struct SeaScoreStore {
    db: DatabaseConnection,
}

impl SeaScoreStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScoreStore for SeaScoreStore {
    async fn query_page(
        &self,
        query: &ScoreQuery,
        limit: usize,
    ) -> Result<Vec<ScoreRow>, DomainError> {
        let rows = find_page(&self.db, query, limit).await?;
        Ok(rows.into_iter().map(ScoreRow::from).collect())
    }

    async fn count_matching(&self, query: &ScoreQuery) -> Result<u64, DomainError> {
        Ok(non_negative(count_page(&self.db, query).await?))
    }

    async fn query_user_best(
        &self,
        query: &ScoreQuery,
        user_id: i64,
    ) -> Result<Option<ScoreRow>, DomainError> {
        let row = find_user_best(&self.db, query, user_id).await?;
        Ok(row.map(ScoreRow::from))
    }

    async fn count_outranking(&self, query: &ScoreQuery, value: f64) -> Result<u64, DomainError> {
        Ok(non_negative(count_above(&self.db, query, value).await?))
    }
}
