use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use serde::de::{self, Visitor};
use tracing::debug;

use crate::application::errors::AppError;
use crate::domain::listing::PageRequest;

/// Raw `?page=&limit=` values. Kept as strings so bad input falls back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    limit: Option<String>,
}

impl PageQuery {
    pub fn into_request(self) -> PageRequest {
        PageRequest::parse(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Unwraps a JSON body, turning any rejection (bad syntax, wrong field types,
/// missing content type) into a validation error with `message`.
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    message: &str,
) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        debug!(error = %rejection, "rejected request body");
        AppError::validation(message)
    })
}

/// `Some` only for strings with non-whitespace content.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Deserialize an optional number that may arrive as a JSON number or as a
/// string, treating `""` and `null` as absent.
pub(crate) fn number_or_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: de::Deserializer<'de>,
    T: FromStr,
    <T as FromStr>::Err: fmt::Display,
{
    struct NumberOrStringVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for NumberOrStringVisitor<T>
    where
        T: FromStr,
        <T as FromStr>::Err: fmt::Display,
    {
        type Value = Option<T>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number, numeric string, or empty string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if v.is_empty() {
                Ok(None)
            } else {
                v.parse::<T>().map(Some).map_err(E::custom)
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            v.to_string().parse::<T>().map(Some).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            v.to_string().parse::<T>().map(Some).map_err(E::custom)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            v.to_string().parse::<T>().map(Some).map_err(E::custom)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: de::Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(NumberOrStringVisitor(PhantomData))
}
