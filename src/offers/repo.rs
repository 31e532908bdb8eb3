use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::query::{OfferQuery, PriceSort};
use crate::error::ApiResult;

#[derive(Debug, Clone, FromRow)]
pub struct Offer {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub details: Value,
    pub image: Option<Value>,
    pub owner_id: Uuid,
    pub created_at: OffsetDateTime,
}

/// An offer joined with its owner's display fields. Credential columns are
/// never selected.
#[derive(Debug, Clone, FromRow)]
pub struct OfferWithOwner {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub details: Value,
    pub image: Option<Value>,
    pub created_at: OffsetDateTime,
    pub owner_username: String,
    pub owner_avatar: Option<Value>,
}

const OFFER_WITH_OWNER: &str = "SELECT o.id, o.title, o.description, o.price, o.details, \
     o.image, o.created_at, a.username AS owner_username, a.avatar AS owner_avatar \
     FROM offers o JOIN accounts a ON a.id = o.owner_id";

impl Offer {
    pub async fn create(
        db: &PgPool,
        owner_id: Uuid,
        title: &str,
        description: &str,
        price: f64,
        details: Value,
        image: Option<Value>,
    ) -> ApiResult<Offer> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (title, description, price, details, image, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, price, details, image, owner_id, created_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(details)
        .bind(image)
        .bind(owner_id)
        .fetch_one(db)
        .await?;
        Ok(offer)
    }

    /// Run one search: a filtered, sorted, paginated page of offers
    /// plus the total number of matches before pagination. Both statements
    /// go through [`push_filters`] so the predicates cannot drift apart.
    pub async fn search(db: &PgPool, query: &OfferQuery) -> ApiResult<(Vec<OfferWithOwner>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM offers o");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut qb = QueryBuilder::<Postgres>::new(OFFER_WITH_OWNER);
        push_filters(&mut qb, query);
        // created_at doubles as insertion order and as the tie-break that
        // keeps pagination stable under equal prices
        match query.sort {
            Some(PriceSort::Asc) => qb.push(" ORDER BY o.price ASC, o.created_at ASC"),
            Some(PriceSort::Desc) => qb.push(" ORDER BY o.price DESC, o.created_at ASC"),
            None => qb.push(" ORDER BY o.created_at ASC"),
        };
        qb.push(" LIMIT ").push_bind(query.page_size);
        qb.push(" OFFSET ").push_bind(query.offset());

        let page = qb.build_query_as::<OfferWithOwner>().fetch_all(db).await?;
        Ok((page, total))
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> ApiResult<Option<OfferWithOwner>> {
        let offer = sqlx::query_as::<_, OfferWithOwner>(&format!("{OFFER_WITH_OWNER} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(offer)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &OfferQuery) {
    let mut clause = " WHERE ";
    if let Some(title) = &query.title {
        qb.push(clause)
            .push("o.title ILIKE ")
            .push_bind(format!("%{}%", escape_like(title)));
        clause = " AND ";
    }
    if let Some(min) = query.price_min {
        qb.push(clause).push("o.price >= ").push_bind(min);
        clause = " AND ";
    }
    if let Some(max) = query.price_max {
        qb.push(clause).push("o.price <= ").push_bind(max);
    }
}

/// Keep user input meaning "substring" inside an ILIKE pattern.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offers::query::{OfferQuery, PriceSort};

    fn base_query() -> OfferQuery {
        OfferQuery {
            title: None,
            price_min: None,
            price_max: None,
            sort: None,
            page: 1,
            page_size: 10,
        }
    }

    fn filter_sql(query: &OfferQuery) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM offers o");
        push_filters(&mut qb, query);
        qb.into_sql()
    }

    #[test]
    fn no_filters_no_where() {
        assert_eq!(filter_sql(&base_query()), "SELECT COUNT(*) FROM offers o");
    }

    #[test]
    fn all_filters_chain_with_and() {
        let q = OfferQuery {
            title: Some("jacket".into()),
            price_min: Some(10.0),
            price_max: Some(50.0),
            ..base_query()
        };
        assert_eq!(
            filter_sql(&q),
            "SELECT COUNT(*) FROM offers o WHERE o.title ILIKE $1 \
             AND o.price >= $2 AND o.price <= $3"
        );
    }

    #[test]
    fn price_max_alone_still_filters() {
        let q = OfferQuery {
            price_max: Some(50.0),
            ..base_query()
        };
        assert_eq!(
            filter_sql(&q),
            "SELECT COUNT(*) FROM offers o WHERE o.price <= $1"
        );
    }

    #[test]
    fn page_sql_orders_and_paginates() {
        let q = OfferQuery {
            sort: Some(PriceSort::Desc),
            page: 2,
            page_size: 5,
            ..base_query()
        };
        let mut qb = QueryBuilder::<Postgres>::new(OFFER_WITH_OWNER);
        push_filters(&mut qb, &q);
        match q.sort {
            Some(PriceSort::Asc) => qb.push(" ORDER BY o.price ASC, o.created_at ASC"),
            Some(PriceSort::Desc) => qb.push(" ORDER BY o.price DESC, o.created_at ASC"),
            None => qb.push(" ORDER BY o.created_at ASC"),
        };
        qb.push(" LIMIT ").push_bind(q.page_size);
        qb.push(" OFFSET ").push_bind(q.offset());
        let sql = qb.into_sql();
        assert!(sql.ends_with("ORDER BY o.price DESC, o.created_at ASC LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn like_wildcards_are_literal() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
