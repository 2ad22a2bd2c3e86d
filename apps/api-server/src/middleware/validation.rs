//! Payload validation.

use actix_web::{FromRequest, HttpRequest, dev::Payload, error::JsonPayloadError, web};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use scribe_shared::dto::FieldOrder;

use super::error::AppError;

/// Largest JSON body accepted, also the most the token middleware will buffer.
pub const JSON_LIMIT: usize = 2 * 1024 * 1024;

/// JSON body that has passed its `validator` rules.
///
/// Violations become 422 with every message joined by `,`.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + FieldOrder + 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let json = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            let web::Json(value) = json.await?;
            value
                .validate()
                .map_err(|e| AppError::Unprocessable(join_messages::<T>(&e)))?;
            Ok(ValidatedJson(value))
        })
    }
}

/// Flatten field errors into one message, in the order `T` declares its fields.
pub fn join_messages<T: FieldOrder>(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| (T::position(field), field.to_string()));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Malformed JSON is reported like a validation failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err: JsonPayloadError, _req| {
            AppError::Unprocessable(err.to_string()).into()
        })
}

/// Unparseable path segments (e.g. a bad UUID) are a bad request.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Unparseable query strings are a bad request.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
