use utoipa::OpenApi;

use crate::routes::{api, auth, health, message};

#[derive(OpenApi)]
#[openapi(info(
    title = "parley-server",
    description = "Multi-session chat front-end over an external webhook workflow engine",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(auth::AuthApi::openapi());
    root.merge(message::MessageApi::openapi());
    root.merge(api::api_docs());
    root
}
