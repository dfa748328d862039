use crate::presentation::http_handlers as h;
use crate::presentation::middleware::require_login;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn configure(cfg: &mut web::ServiceConfig) {
    let login_required = HttpAuthentication::with_fn(require_login);

    cfg
        // Auth routes
        .service(
            web::scope("/auth")
                .route("/registration/", web::post().to(h::register))
                .route("/login/", web::post().to(h::login)),
        )
        // Public listings
        .route("/", web::get().to(h::index))
        .route("/category/{category_slug}/", web::get().to(h::category_posts))
        .route("/profile/{username}/", web::get().to(h::profile))
        // Must come before /posts/{post_id}/
        .service(
            web::resource("/posts/create/")
                .route(web::get().to(h::create_post_form))
                .route(web::post().to(h::create_post))
                .wrap(login_required.clone()),
        )
        .route("/posts/{post_id}/", web::get().to(h::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(h::edit_post_form))
                .route(web::post().to(h::edit_post))
                .wrap(login_required.clone()),
        )
        .service(
            web::resource("/posts/{post_id}/delete/")
                .route(web::get().to(h::delete_post_confirm))
                .route(web::post().to(h::delete_post))
                .wrap(login_required.clone()),
        )
        .service(
            web::resource("/posts/{post_id}/comment/")
                .route(web::post().to(h::add_comment))
                .wrap(login_required.clone()),
        )
        .service(
            web::resource("/posts/{post_id}/edit_comment/{comment_id}/")
                .route(web::get().to(h::edit_comment_form))
                .route(web::post().to(h::edit_comment))
                .wrap(login_required.clone()),
        )
        .service(
            web::resource("/posts/{post_id}/delete_comment/{comment_id}/")
                .route(web::get().to(h::delete_comment_confirm))
                .route(web::post().to(h::delete_comment))
                .wrap(login_required),
        );
}
