mod requests;
mod responses;

use crate::{
    auth::AuthUser,
    database::get_db_conn,
    error::ApiError,
    models::news::{NewNews, NewsData, UpdateNews, DEFAULT_CATEGORY},
    protocol::{MessageResponse, PageQuery},
    schema::news,
    DbPool,
};
use actix_web::{delete, get, post, put, web};
use diesel::{prelude::*, sqlite::Sqlite, SqliteConnection};
use tracing::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_news)
        .service(all_news)
        .service(view_news)
        .service(create_news)
        .service(update_news)
        .service(delete_news);
}

crate::api_funcs! {
    (get, list_news, "", Ok, (pool: web::Data<DbPool>, info: web::Query<NewsQuery>, page: web::Query<PageQuery>)),
    (get, all_news, "/all", Ok, (pool: web::Data<DbPool>, auth: AuthUser)),
    (get, view_news, "/{slug}", Ok, (pool: web::Data<DbPool>, path: web::Path<String>)),
    (post, create_news, "", Created, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Json<CreateNewsRequest>)),
    (put, update_news, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>, info: web::Json<UpdateNewsRequest>)),
    (delete, delete_news, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
}

/// A slug for `title` not used by any article other than `except`.
fn free_slug(conn: &mut SqliteConnection, title: &str, except: Option<i32>) -> QueryResult<String> {
    let base = crate::utils::slugify(title);
    crate::utils::unique_slug(&base, |slug| {
        let res = news::table
            .filter(news::slug.eq(slug))
            .filter(news::id.ne(except.unwrap_or(0)))
            .count()
            .get_result::<i64>(conn)?;
        Ok(res > 0)
    })
}

fn published(category: Option<String>) -> news::BoxedQuery<'static, Sqlite> {
    let mut query = news::table.filter(news::is_published.eq(true)).into_boxed();
    if let Some(category) = category {
        query = query.filter(news::category.eq(category));
    }
    query
}

async fn list_news_impl(
    pool: web::Data<DbPool>,
    info: web::Query<NewsQuery>,
    page: web::Query<PageQuery>,
) -> Result<NewsListResponse, ApiError> {
    let category = crate::utils::optional(info.into_inner().category);
    let (offset, limit) = (page.offset(), page.limit());

    let mut conn = get_db_conn(&pool)?;
    let (news, total) = web::block(move || {
        let total = published(category.clone())
            .count()
            .get_result::<i64>(&mut conn)?;
        let news = published(category)
            .order((news::published_at.desc(), news::created_at.desc()))
            .offset(offset)
            .limit(limit)
            .load::<NewsData>(&mut conn)?;
        Ok::<_, diesel::result::Error>((news, total))
    })
    .await??;

    Ok(NewsListResponse {
        news: news.into_iter().map(NewsItem::from).collect(),
        total,
    })
}

async fn all_news_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
) -> Result<NewsListResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = get_db_conn(&pool)?;
    let news = web::block(move || {
        news::table
            .order(news::created_at.desc())
            .load::<NewsData>(&mut conn)
    })
    .await??;

    Ok(NewsListResponse {
        total: news.len() as i64,
        news: news.into_iter().map(NewsItem::from).collect(),
    })
}

async fn view_news_impl(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> Result<ArticleResponse, ApiError> {
    let slug = path.into_inner();

    let mut conn = get_db_conn(&pool)?;
    let article = web::block(move || {
        news::table
            .filter(news::slug.eq(slug))
            .filter(news::is_published.eq(true))
            .first::<NewsData>(&mut conn)
            .optional()
    })
    .await??
    .ok_or_else(|| ApiError::not_found("Article"))?;

    Ok(ArticleResponse {
        article: article.into(),
    })
}

async fn create_news_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Json<CreateNewsRequest>,
) -> Result<ArticleResponse, ApiError> {
    auth.require_admin()?;
    let info = info.into_inner();
    let title = crate::utils::required(&info.title, "Title")?;
    let content = crate::utils::required(&info.content, "Content")?;
    let excerpt = crate::utils::optional(info.excerpt)
        .unwrap_or_else(|| crate::utils::make_excerpt(&content));
    let category =
        crate::utils::optional(info.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let now = crate::utils::now();

    let mut conn = get_db_conn(&pool)?;
    let article = web::block(move || {
        conn.immediate_transaction::<_, ApiError, _>(|conn| {
            let data = NewNews {
                slug: free_slug(conn, &title, None)?,
                title,
                excerpt,
                content,
                image_url: crate::utils::optional(info.image_url),
                category,
                author_id: Some(auth.id),
                is_published: info.is_published,
                published_at: info.is_published.then_some(now),
                created_at: now,
                updated_at: now,
            };
            Ok(diesel::insert_into(news::table)
                .values(&data)
                .get_result::<NewsData>(conn)?)
        })
    })
    .await??;
    info!(news_id = article.id, slug = %article.slug, "news article created");

    Ok(ArticleResponse {
        article: article.into(),
    })
}

async fn update_news_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
    info: web::Json<UpdateNewsRequest>,
) -> Result<ArticleResponse, ApiError> {
    auth.require_admin()?;
    let news_id = path.into_inner();
    let info = info.into_inner();
    let title = info
        .title
        .map(|v| crate::utils::required(v, "Title"))
        .transpose()?;
    let content = info
        .content
        .map(|v| crate::utils::required(v, "Content"))
        .transpose()?;
    let now = crate::utils::now();

    let mut conn = get_db_conn(&pool)?;
    let article = web::block(move || {
        conn.immediate_transaction::<_, ApiError, _>(|conn| {
            let current = news::table
                .find(news_id)
                .first::<NewsData>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("Article"))?;

            let slug = match &title {
                Some(title) if *title != current.title => {
                    Some(free_slug(conn, title, Some(news_id))?)
                }
                _ => None,
            };
            let excerpt = crate::utils::optional(info.excerpt).or_else(|| {
                content
                    .as_ref()
                    .map(|content| crate::utils::make_excerpt(content))
            });
            let first_publish = info.is_published == Some(true) && current.published_at.is_none();

            let data = UpdateNews {
                title,
                slug,
                excerpt,
                content,
                image_url: crate::utils::optional(info.image_url),
                category: crate::utils::optional(info.category),
                is_published: info.is_published,
                published_at: first_publish.then_some(now),
                updated_at: Some(now),
            };
            Ok(diesel::update(news::table.find(news_id))
                .set(&data)
                .get_result::<NewsData>(conn)?)
        })
    })
    .await??;

    Ok(ArticleResponse {
        article: article.into(),
    })
}

async fn delete_news_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<MessageResponse, ApiError> {
    auth.require_admin()?;
    let news_id = path.into_inner();

    let mut conn = get_db_conn(&pool)?;
    let res = web::block(move || diesel::delete(news::table.find(news_id)).execute(&mut conn))
        .await??;
    if res == 0 {
        return Err(ApiError::not_found("Article"));
    }
    info!(news_id, "news article deleted");

    Ok(MessageResponse::ok("Article deleted"))
}
