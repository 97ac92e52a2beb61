use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::{Date, OffsetDateTime};

use crate::application::catalog::{
    CatalogStore, CreateSightParams, StoreError, UpdateSightParams,
};
use crate::domain::entities::{SightProfileRecord, SightRecord, TicketRecord};

use super::{PostgresCatalog, map_sqlx_error};

const SIGHT_COLUMNS: &str = "id, name, \"desc\", main_img, banner_img, content, score, \
     min_price, province, city, area, town, is_top, is_hot, is_valid, created_at, updated_at";

const TICKET_COLUMNS: &str = "id, sight_id, name, \"desc\", kind, price, discount, total, \
     remain, expire_date, return_policy, is_valid, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct SightRow {
    id: i64,
    name: String,
    desc: String,
    main_img: String,
    banner_img: String,
    content: String,
    score: f64,
    min_price: f64,
    province: String,
    city: String,
    area: Option<String>,
    town: Option<String>,
    is_top: bool,
    is_hot: bool,
    is_valid: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl SightRow {
    fn into_record(
        self,
        profile: Option<SightProfileRecord>,
        tickets: Vec<TicketRecord>,
    ) -> SightRecord {
        SightRecord {
            id: self.id,
            name: self.name,
            desc: self.desc,
            main_img: self.main_img,
            banner_img: self.banner_img,
            content: self.content,
            score: self.score,
            min_price: self.min_price,
            province: self.province,
            city: self.city,
            area: self.area,
            town: self.town,
            is_top: self.is_top,
            is_hot: self.is_hot,
            is_valid: self.is_valid,
            created_at: self.created_at,
            updated_at: self.updated_at,
            profile,
            tickets,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    sight_id: i64,
    img: String,
    address: String,
    explain: Option<String>,
    open_time: String,
    tel: String,
    level: Option<String>,
    tags: Option<String>,
    attention: Option<String>,
    location: Option<String>,
}

impl From<ProfileRow> for SightProfileRecord {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            sight_id: row.sight_id,
            img: row.img,
            address: row.address,
            explain: row.explain,
            open_time: row.open_time,
            tel: row.tel,
            level: row.level,
            tags: row.tags,
            attention: row.attention,
            location: row.location,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i64,
    sight_id: i64,
    name: String,
    desc: Option<String>,
    kind: Option<String>,
    price: f64,
    discount: f64,
    total: i32,
    remain: i32,
    expire_date: Option<Date>,
    return_policy: Option<String>,
    is_valid: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<TicketRow> for TicketRecord {
    fn from(row: TicketRow) -> Self {
        Self {
            id: row.id,
            sight_id: row.sight_id,
            name: row.name,
            desc: row.desc,
            kind: row.kind,
            price: row.price,
            discount: row.discount,
            total: row.total,
            remain: row.remain,
            expire_date: row.expire_date,
            return_policy: row.return_policy,
            is_valid: row.is_valid,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresCatalog {
    /// Load profiles and tickets for the given sights and stitch them in.
    async fn attach_associations(
        &self,
        rows: Vec<SightRow>,
    ) -> Result<Vec<SightRecord>, StoreError> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let profiles: Vec<ProfileRow> = sqlx::query_as(
            "SELECT id, sight_id, img, address, \"explain\", open_time, tel, level, tags, \
             attention, location \
             FROM sight_profile WHERE sight_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let tickets: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM sight_ticket WHERE sight_id = ANY($1) ORDER BY id"
        ))
        .bind(&ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut profile_map: HashMap<i64, SightProfileRecord> = profiles
            .into_iter()
            .map(|row| (row.sight_id, row.into()))
            .collect();
        let mut ticket_map: HashMap<i64, Vec<TicketRecord>> = HashMap::new();
        for row in tickets {
            ticket_map.entry(row.sight_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let profile = profile_map.remove(&row.id);
                let sight_tickets = ticket_map.remove(&row.id).unwrap_or_default();
                row.into_record(profile, sight_tickets)
            })
            .collect())
    }

    fn push_search_conditions<'q>(qb: &mut QueryBuilder<'q, Postgres>, keyword: &'q str) {
        // Postgres ILIKE: the substring match is case-insensitive here,
        // unlike a store whose default collation is case-sensitive.
        let needle = format!("%{keyword}%");
        qb.push(" WHERE (name ILIKE ");
        qb.push_bind(needle.clone());
        qb.push(" OR province ILIKE ");
        qb.push_bind(needle.clone());
        qb.push(" OR city ILIKE ");
        qb.push_bind(needle.clone());
        qb.push(" OR area ILIKE ");
        qb.push_bind(needle);
        qb.push(")");
    }

    fn convert_count(value: i64) -> Result<u64, StoreError> {
        value
            .try_into()
            .map_err(|_| StoreError::from_persistence("count exceeds supported range"))
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalog {
    async fn get_by_id(&self, id: i64) -> Result<Option<SightRecord>, StoreError> {
        let row: Option<SightRow> =
            sqlx::query_as(&format!("SELECT {SIGHT_COLUMNS} FROM sight WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut records = self.attach_associations(vec![row]).await?;
        Ok(records.pop())
    }

    async fn list(&self, skip: u64, limit: u32) -> Result<Vec<SightRecord>, StoreError> {
        let rows: Vec<SightRow> = sqlx::query_as(&format!(
            "SELECT {SIGHT_COLUMNS} FROM sight ORDER BY id OFFSET $1 LIMIT $2"
        ))
        .bind(skip as i64)
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.attach_associations(rows).await
    }

    async fn list_hot(&self, limit: u32) -> Result<Vec<SightRecord>, StoreError> {
        let rows: Vec<SightRow> = sqlx::query_as(&format!(
            "SELECT {SIGHT_COLUMNS} FROM sight WHERE is_hot ORDER BY id LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.attach_associations(rows).await
    }

    async fn list_fine(&self, limit: u32) -> Result<Vec<SightRecord>, StoreError> {
        let rows: Vec<SightRow> = sqlx::query_as(&format!(
            "SELECT {SIGHT_COLUMNS} FROM sight WHERE is_top ORDER BY id LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.attach_associations(rows).await
    }

    async fn search(
        &self,
        keyword: &str,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<SightRecord>, StoreError> {
        let mut qb = QueryBuilder::new(format!("SELECT {SIGHT_COLUMNS} FROM sight"));
        Self::push_search_conditions(&mut qb, keyword);
        qb.push(" ORDER BY id OFFSET ");
        qb.push_bind(skip as i64);
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(limit));

        let rows: Vec<SightRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        self.attach_associations(rows).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sight")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn count_search(&self, keyword: &str) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM sight");
        Self::push_search_conditions(&mut qb, keyword);

        let (count,): (i64,) = qb
            .build_query_as()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn create(&self, params: CreateSightParams) -> Result<SightRecord, StoreError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let row: SightRow = sqlx::query_as(&format!(
            "INSERT INTO sight \
             (name, \"desc\", main_img, banner_img, content, score, min_price, \
              province, city, area, town, is_top, is_hot, is_valid) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {SIGHT_COLUMNS}"
        ))
        .bind(&params.name)
        .bind(&params.desc)
        .bind(&params.main_img)
        .bind(&params.banner_img)
        .bind(&params.content)
        .bind(params.score)
        .bind(params.min_price)
        .bind(&params.province)
        .bind(&params.city)
        .bind(&params.area)
        .bind(&params.town)
        .bind(params.is_top)
        .bind(params.is_hot)
        .bind(params.is_valid)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let profile: ProfileRow = sqlx::query_as(
            "INSERT INTO sight_profile \
             (sight_id, img, address, \"explain\", open_time, tel, level, tags, attention, location) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id, sight_id, img, address, \"explain\", open_time, tel, level, tags, \
             attention, location",
        )
        .bind(row.id)
        .bind(&params.profile.img)
        .bind(&params.profile.address)
        .bind(&params.profile.explain)
        .bind(&params.profile.open_time)
        .bind(&params.profile.tel)
        .bind(&params.profile.level)
        .bind(&params.profile.tags)
        .bind(&params.profile.attention)
        .bind(&params.profile.location)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(row.into_record(Some(profile.into()), Vec::new()))
    }

    async fn update(&self, id: i64, params: UpdateSightParams) -> Result<SightRecord, StoreError> {
        if params.is_noop() {
            return self.get_by_id(id).await?.ok_or(StoreError::NotFound);
        }

        let mut qb = QueryBuilder::new("UPDATE sight SET ");
        let mut fields = qb.separated(", ");
        if let Some(name) = &params.name {
            fields.push("name = ").push_bind_unseparated(name);
        }
        if let Some(desc) = &params.desc {
            fields.push("\"desc\" = ").push_bind_unseparated(desc);
        }
        if let Some(main_img) = &params.main_img {
            fields.push("main_img = ").push_bind_unseparated(main_img);
        }
        if let Some(banner_img) = &params.banner_img {
            fields
                .push("banner_img = ")
                .push_bind_unseparated(banner_img);
        }
        if let Some(content) = &params.content {
            fields.push("content = ").push_bind_unseparated(content);
        }
        if let Some(score) = params.score {
            fields.push("score = ").push_bind_unseparated(score);
        }
        if let Some(min_price) = params.min_price {
            fields.push("min_price = ").push_bind_unseparated(min_price);
        }
        if let Some(province) = &params.province {
            fields.push("province = ").push_bind_unseparated(province);
        }
        if let Some(city) = &params.city {
            fields.push("city = ").push_bind_unseparated(city);
        }
        if let Some(area) = &params.area {
            fields.push("area = ").push_bind_unseparated(area);
        }
        if let Some(town) = &params.town {
            fields.push("town = ").push_bind_unseparated(town);
        }
        if let Some(is_top) = params.is_top {
            fields.push("is_top = ").push_bind_unseparated(is_top);
        }
        if let Some(is_hot) = params.is_hot {
            fields.push("is_hot = ").push_bind_unseparated(is_hot);
        }
        if let Some(is_valid) = params.is_valid {
            fields.push("is_valid = ").push_bind_unseparated(is_valid);
        }
        fields.push("updated_at = now()");

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(format!(" RETURNING {SIGHT_COLUMNS}"));

        let row: Option<SightRow> = qb
            .build_query_as()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let row = row.ok_or(StoreError::NotFound)?;
        let mut records = self.attach_associations(vec![row]).await?;
        records.pop().ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        // Child rows go first: tickets, then the 1:1 profile, then the sight.
        sqlx::query("DELETE FROM sight_ticket WHERE sight_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        sqlx::query("DELETE FROM sight_profile WHERE sight_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        let result = sqlx::query("DELETE FROM sight WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<TicketRecord>, StoreError> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM sight_ticket WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn list_tickets(&self, skip: u64, limit: u32) -> Result<Vec<TicketRecord>, StoreError> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM sight_ticket ORDER BY id OFFSET $1 LIMIT $2"
        ))
        .bind(skip as i64)
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn tickets_by_sight(&self, sight_id: i64) -> Result<Vec<TicketRecord>, StoreError> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM sight_ticket WHERE sight_id = $1 ORDER BY id"
        ))
        .bind(sight_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
