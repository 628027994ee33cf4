mod requests;
mod responses;

use crate::{
    auth::AuthUser,
    database::{assert, get_db_conn},
    error::ApiError,
    models::sch_stories::{NewStory, Story, UpdateStory},
    protocol::MessageResponse,
    schema::sch_stories,
    DbPool,
};
use actix_web::{delete, get, post, put, web};
use diesel::{prelude::*, SqliteConnection};
use tracing::info;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(active_story)
        .service(list_stories)
        .service(create_story)
        .service(update_story)
        .service(activate_story)
        .service(delete_story);
}

crate::api_funcs! {
    (get, active_story, "/active", Ok, (pool: web::Data<DbPool>)),
    (get, list_stories, "", Ok, (pool: web::Data<DbPool>, auth: AuthUser)),
    (post, create_story, "", Created, (pool: web::Data<DbPool>, auth: AuthUser, info: web::Json<CreateStoryRequest>)),
    (put, update_story, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>, info: web::Json<UpdateStoryRequest>)),
    (put, activate_story, "/{id}/activate", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
    (delete, delete_story, "/{id}", Ok, (pool: web::Data<DbPool>, auth: AuthUser, path: web::Path<i32>)),
}

/// At most one story is active; call inside the transaction that activates another.
fn deactivate_all(conn: &mut SqliteConnection) -> QueryResult<usize> {
    diesel::update(sch_stories::table.filter(sch_stories::is_active.eq(true)))
        .set((
            sch_stories::is_active.eq(false),
            sch_stories::updated_at.eq(crate::utils::now()),
        ))
        .execute(conn)
}

async fn active_story_impl(pool: web::Data<DbPool>) -> Result<ActiveStoryResponse, ApiError> {
    let mut conn = get_db_conn(&pool)?;
    let story = web::block(move || {
        sch_stories::table
            .filter(sch_stories::is_active.eq(true))
            .order(sch_stories::updated_at.desc())
            .first::<Story>(&mut conn)
            .optional()
    })
    .await??;

    Ok(ActiveStoryResponse {
        story: story.map(StoryItem::from),
    })
}

async fn list_stories_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
) -> Result<StoriesResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = get_db_conn(&pool)?;
    let stories = web::block(move || {
        sch_stories::table
            .order(sch_stories::created_at.desc())
            .load::<Story>(&mut conn)
    })
    .await??;

    Ok(StoriesResponse {
        stories: stories.into_iter().map(StoryItem::from).collect(),
    })
}

async fn create_story_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    info: web::Json<CreateStoryRequest>,
) -> Result<StoryResponse, ApiError> {
    auth.require_admin()?;
    let info = info.into_inner();
    let now = crate::utils::now();
    let data = NewStory {
        title: crate::utils::required(&info.title, "Title")?,
        description: crate::utils::optional(info.description),
        video_url: crate::utils::optional(info.video_url),
        image_url: crate::utils::optional(info.image_url),
        is_active: info.is_active,
        created_at: now,
        updated_at: now,
    };

    let mut conn = get_db_conn(&pool)?;
    let story = web::block(move || {
        conn.immediate_transaction::<_, ApiError, _>(|conn| {
            if data.is_active {
                deactivate_all(conn)?;
            }
            Ok(diesel::insert_into(sch_stories::table)
                .values(&data)
                .get_result::<Story>(conn)?)
        })
    })
    .await??;
    info!(story_id = story.id, active = story.is_active, "story created");

    Ok(StoryResponse {
        story: story.into(),
    })
}

async fn update_story_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
    info: web::Json<UpdateStoryRequest>,
) -> Result<StoryResponse, ApiError> {
    auth.require_admin()?;
    let story_id = path.into_inner();
    let info = info.into_inner();
    let data = UpdateStory {
        title: info
            .title
            .map(|v| crate::utils::required(v, "Title"))
            .transpose()?,
        description: crate::utils::optional(info.description),
        video_url: crate::utils::optional(info.video_url),
        image_url: crate::utils::optional(info.image_url),
        is_active: info.is_active,
        updated_at: Some(crate::utils::now()),
    };
    assert::assert_story(&pool, story_id).await?;

    let mut conn = get_db_conn(&pool)?;
    let story = web::block(move || {
        conn.immediate_transaction::<_, ApiError, _>(|conn| {
            if data.is_active == Some(true) {
                deactivate_all(conn)?;
            }
            Ok(diesel::update(sch_stories::table.find(story_id))
                .set(&data)
                .get_result::<Story>(conn)?)
        })
    })
    .await??;

    Ok(StoryResponse {
        story: story.into(),
    })
}

async fn activate_story_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<StoryResponse, ApiError> {
    auth.require_admin()?;
    let story_id = path.into_inner();
    assert::assert_story(&pool, story_id).await?;

    let mut conn = get_db_conn(&pool)?;
    let story = web::block(move || {
        conn.immediate_transaction::<_, ApiError, _>(|conn| {
            deactivate_all(conn)?;
            Ok(diesel::update(sch_stories::table.find(story_id))
                .set((
                    sch_stories::is_active.eq(true),
                    sch_stories::updated_at.eq(crate::utils::now()),
                ))
                .get_result::<Story>(conn)?)
        })
    })
    .await??;
    info!(story_id, "story activated");

    Ok(StoryResponse {
        story: story.into(),
    })
}

async fn delete_story_impl(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<MessageResponse, ApiError> {
    auth.require_admin()?;
    let story_id = path.into_inner();
    assert::assert_story(&pool, story_id).await?;

    let mut conn = get_db_conn(&pool)?;
    web::block(move || diesel::delete(sch_stories::table.find(story_id)).execute(&mut conn))
        .await??;
    info!(story_id, "story deleted");

    Ok(MessageResponse::ok("Story deleted"))
}
