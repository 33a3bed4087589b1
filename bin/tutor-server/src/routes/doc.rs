use utoipa::OpenApi;

use super::{auth, chat, health, history, subjects, upload, users};

#[derive(OpenApi)]
#[openapi(info(
    title = "tutor-server",
    description = "AI study tutor API",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(auth::AuthApi::openapi());
    root.merge(users::UsersApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(upload::UploadApi::openapi());
    root.merge(history::HistoryApi::openapi());
    root.merge(subjects::SubjectsApi::openapi());
    root
}
