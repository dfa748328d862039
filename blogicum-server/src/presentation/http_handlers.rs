use crate::application::blog_service::{FormChoices, PostDetail};
use crate::application::{AuthService, BlogService, Guarded};
use crate::domain::comment::CommentForm;
use crate::domain::post::{post_url, PostForm};
use crate::domain::user::{LoginUserRequest, Profile, RegisterUserRequest, UserResponse};
use crate::domain::{Category, Comment, DomainError, Page, PageRequest, PostCard, Requester};
use crate::presentation::middleware::Viewer;
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage, HttpRequest, HttpResponse, Responder};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use std::sync::Arc;

pub const INDEX_URL: &str = "/";

// Структура для ответа с токеном
#[derive(Serialize)]
struct AuthResponse {
    token: String,
    user: UserResponse,
}

#[derive(Serialize)]
struct ListContext {
    page_obj: Page<PostCard>,
}

#[derive(Serialize)]
struct CategoryContext {
    category: Category,
    page_obj: Page<PostCard>,
}

#[derive(Serialize)]
struct ProfileContext {
    profile: Profile,
    page_obj: Page<PostCard>,
}

#[derive(Serialize)]
struct CommentFormContext {
    action: String,
    initial: Option<CommentForm>,
}

#[derive(Serialize)]
struct DetailContext {
    #[serde(flatten)]
    detail: PostDetail,
    form: CommentFormContext,
}

#[derive(Serialize)]
struct PostFormContext {
    action: String,
    initial: Option<PostForm>,
    choices: FormChoices,
}

#[derive(Serialize)]
struct CommentContext {
    comment: Comment,
    form: CommentFormContext,
}

// Everything that could end or split a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, SEGMENT))
}

fn comment_url(post_id: i64, action: &str, comment_id: i64) -> String {
    format!("/posts/{}/{}/{}/", post_id, action, comment_id)
}

fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

// Set by the login gate for every route that needs an author.
fn requester_from_request(req: &HttpRequest) -> Result<Requester, DomainError> {
    req.extensions()
        .get::<Requester>()
        .cloned()
        .ok_or(DomainError::Unauthorized(
            "User not authenticated".to_string(),
        ))
}

// Преобразование DomainError в HttpResponse
fn error_to_response(err: DomainError) -> HttpResponse {
    let status_code = err.to_status_code();
    let message = err.to_string();

    match status_code {
        400 => HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
        401 => HttpResponse::Unauthorized().json(serde_json::json!({ "error": message })),
        404 => HttpResponse::NotFound().json(serde_json::json!({ "error": message })),
        409 => HttpResponse::Conflict().json(serde_json::json!({ "error": message })),
        _ => {
            tracing::error!("Request failed: {}", message);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Internal server error" }))
        }
    }
}

// An unreadable form body is a form error, reported after the author check.
fn form_body<T>(form: Result<web::Json<T>, Error>) -> Result<T, DomainError> {
    form.map(web::Json::into_inner)
        .map_err(|e| DomainError::ValidationError(format!("Invalid form: {}", e)))
}

/// Maps an author-only outcome onto a redirect: `done` for the author, `diverted` otherwise.
fn guarded_redirect<T>(
    outcome: Result<Guarded<T>, DomainError>,
    done: String,
    diverted: String,
) -> HttpResponse {
    match outcome {
        Ok(Guarded::Allowed(_)) => redirect(done),
        Ok(Guarded::NotAuthor) => redirect(diverted),
        Err(err) => error_to_response(err),
    }
}

// ============== Auth Handlers ==============

pub async fn register(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<RegisterUserRequest>,
) -> impl Responder {
    match auth_service.register(req.into_inner()).await {
        Ok((token, user)) => HttpResponse::Created().json(AuthResponse { token, user }),
        Err(err) => error_to_response(err),
    }
}

pub async fn login(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<LoginUserRequest>,
) -> impl Responder {
    match auth_service.login(req.into_inner()).await {
        Ok((token, user)) => HttpResponse::Ok().json(AuthResponse { token, user }),
        Err(err) => error_to_response(err),
    }
}

// ============== Listings ==============

pub async fn index(
    blog_service: web::Data<Arc<BlogService>>,
    query: web::Query<PageRequest>,
) -> impl Responder {
    tracing::debug!("Index page={}", query.page);

    match blog_service.index(query.into_inner()).await {
        Ok(page_obj) => HttpResponse::Ok().json(ListContext { page_obj }),
        Err(err) => error_to_response(err),
    }
}

pub async fn category_posts(
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<String>,
    query: web::Query<PageRequest>,
) -> impl Responder {
    let slug = path.into_inner();

    tracing::debug!("Category {} page={}", slug, query.page);

    match blog_service.category_posts(&slug, query.into_inner()).await {
        Ok((category, page_obj)) => HttpResponse::Ok().json(CategoryContext { category, page_obj }),
        Err(err) => error_to_response(err),
    }
}

pub async fn profile(
    viewer: Viewer,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<String>,
    query: web::Query<PageRequest>,
) -> impl Responder {
    let username = path.into_inner();

    match blog_service
        .profile(&username, viewer.requester(), query.into_inner())
        .await
    {
        Ok((profile, page_obj)) => HttpResponse::Ok().json(ProfileContext { profile, page_obj }),
        Err(err) => error_to_response(err),
    }
}

// ============== Post Handlers ==============

pub async fn post_detail(
    viewer: Viewer,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();

    tracing::debug!("Getting post with id={}", post_id);

    match blog_service.post_detail(post_id, viewer.requester()).await {
        Ok(detail) => HttpResponse::Ok().json(DetailContext {
            detail,
            form: CommentFormContext {
                action: format!("/posts/{}/comment/", post_id),
                initial: None,
            },
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_post_form(blog_service: web::Data<Arc<BlogService>>) -> impl Responder {
    match blog_service.form_choices().await {
        Ok(choices) => HttpResponse::Ok().json(PostFormContext {
            action: "/posts/create/".to_string(),
            initial: None,
            choices,
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_post(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    form: web::Json<PostForm>,
) -> impl Responder {
    let requester = match requester_from_request(&req) {
        Ok(requester) => requester,
        Err(err) => return error_to_response(err),
    };

    tracing::info!("Creating post for user_id={}", requester.id);

    match blog_service.create_post(&requester, form.into_inner()).await {
        Ok(_) => redirect(profile_url(&requester.username)),
        Err(err) => error_to_response(err),
    }
}

pub async fn edit_post_form(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();
    let requester = match requester_from_request(&req) {
        Ok(requester) => requester,
        Err(err) => return error_to_response(err),
    };

    let card = match blog_service.post_for_edit(post_id, &requester).await {
        Ok(Guarded::Allowed(card)) => card,
        Ok(Guarded::NotAuthor) => return redirect(post_url(post_id)),
        Err(err) => return error_to_response(err),
    };

    match blog_service.form_choices().await {
        Ok(choices) => HttpResponse::Ok().json(PostFormContext {
            action: format!("/posts/{}/edit/", post_id),
            initial: Some(PostForm::from(&card.post)),
            choices,
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn edit_post(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
    form: Result<web::Json<PostForm>, Error>,
) -> impl Responder {
    let post_id = path.into_inner();
    let requester = match requester_from_request(&req) {
        Ok(requester) => requester,
        Err(err) => return error_to_response(err),
    };

    // Authorship is settled before the body is looked at.
    match blog_service.post_for_edit(post_id, &requester).await {
        Ok(Guarded::Allowed(_)) => {}
        Ok(Guarded::NotAuthor) => return redirect(post_url(post_id)),
        Err(err) => return error_to_response(err),
    }
    let form = match form_body(form) {
        Ok(form) => form,
        Err(err) => return error_to_response(err),
    };

    tracing::info!("Updating post id={} for user_id={}", post_id, requester.id);

    let outcome = blog_service.update_post(post_id, &requester, form).await;
    guarded_redirect(outcome, post_url(post_id), post_url(post_id))
}

pub async fn delete_post_confirm(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();
    let requester = match requester_from_request(&req) {
        Ok(requester) => requester,
        Err(err) => return error_to_response(err),
    };

    match blog_service.post_for_edit(post_id, &requester).await {
        Ok(Guarded::Allowed(post)) => HttpResponse::Ok().json(serde_json::json!({ "post": post })),
        Ok(Guarded::NotAuthor) => redirect(INDEX_URL),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_post(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();
    let requester = match requester_from_request(&req) {
        Ok(requester) => requester,
        Err(err) => return error_to_response(err),
    };

    tracing::info!("Deleting post id={} for user_id={}", post_id, requester.id);

    let outcome = blog_service.delete_post(post_id, &requester).await;
    guarded_redirect(outcome, INDEX_URL.to_string(), INDEX_URL.to_string())
}

// ============== Comment Handlers ==============

pub async fn add_comment(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<i64>,
    form: Result<web::Json<CommentForm>, Error>,
) -> impl Responder {
    let post_id = path.into_inner();
    let requester = match requester_from_request(&req) {
        Ok(requester) => requester,
        Err(err) => return error_to_response(err),
    };

    if let Err(err) = blog_service.visible_post(post_id, Some(&requester)).await {
        return error_to_response(err);
    }
    let form = match form_body(form) {
        Ok(form) => form,
        Err(err) => return error_to_response(err),
    };

    match blog_service.add_comment(post_id, &requester, form).await
    {
        Ok(_) => redirect(post_url(post_id)),
        Err(err) => error_to_response(err),
    }
}

pub async fn edit_comment_form(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let (post_id, comment_id) = path.into_inner();
    let requester = match requester_from_request(&req) {
        Ok(requester) => requester,
        Err(err) => return error_to_response(err),
    };

    match blog_service
        .comment_for_edit(post_id, comment_id, &requester)
        .await
    {
        Ok(Guarded::Allowed(comment)) => HttpResponse::Ok().json(CommentContext {
            form: CommentFormContext {
                action: comment_url(post_id, "edit_comment", comment_id),
                initial: Some(CommentForm {
                    text: comment.text.clone(),
                }),
            },
            comment,
        }),
        Ok(Guarded::NotAuthor) => redirect(post_url(post_id)),
        Err(err) => error_to_response(err),
    }
}

pub async fn edit_comment(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<(i64, i64)>,
    form: Result<web::Json<CommentForm>, Error>,
) -> impl Responder {
    let (post_id, comment_id) = path.into_inner();
    let requester = match requester_from_request(&req) {
        Ok(requester) => requester,
        Err(err) => return error_to_response(err),
    };

    match blog_service
        .comment_for_edit(post_id, comment_id, &requester)
        .await
    {
        Ok(Guarded::Allowed(_)) => {}
        Ok(Guarded::NotAuthor) => return redirect(post_url(post_id)),
        Err(err) => return error_to_response(err),
    }
    let form = match form_body(form) {
        Ok(form) => form,
        Err(err) => return error_to_response(err),
    };

    let outcome = blog_service
        .update_comment(post_id, comment_id, &requester, form)
        .await;
    guarded_redirect(outcome, post_url(post_id), post_url(post_id))
}

pub async fn delete_comment_confirm(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let (post_id, comment_id) = path.into_inner();
    let requester = match requester_from_request(&req) {
        Ok(requester) => requester,
        Err(err) => return error_to_response(err),
    };

    match blog_service
        .comment_for_edit(post_id, comment_id, &requester)
        .await
    {
        Ok(Guarded::Allowed(comment)) => {
            HttpResponse::Ok().json(serde_json::json!({ "comment": comment }))
        }
        Ok(Guarded::NotAuthor) => redirect(post_url(post_id)),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_comment(
    req: HttpRequest,
    blog_service: web::Data<Arc<BlogService>>,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let (post_id, comment_id) = path.into_inner();
    let requester = match requester_from_request(&req) {
        Ok(requester) => requester,
        Err(err) => return error_to_response(err),
    };

    let outcome = blog_service
        .delete_comment(post_id, comment_id, &requester)
        .await;
    guarded_redirect(outcome, post_url(post_id), post_url(post_id))
}
