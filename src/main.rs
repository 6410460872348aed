use pizzeria_admin_lib::error::{AppError, ErrorResponse};

fn main() {
    if let Err(err) = pizzeria_admin_lib::run() {
        let response = match err.downcast_ref::<AppError>() {
            Some(app_error) => ErrorResponse::from(app_error),
            None => ErrorResponse {
                code: "INTERNAL_ERROR".to_string(),
                message: err.to_string(),
            },
        };
        eprintln!(
            "{}",
            serde_json::to_string(&response).unwrap_or_else(|_| response.message.clone())
        );
        std::process::exit(1);
    }
}
