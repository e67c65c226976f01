//! `application/x-www-form-urlencoded` serialization.
//!
//! Used for both the URL query string and form bodies. Keys and values are
//! UTF-8 percent-encoded, spaces become `+`, pairs are joined with `&`.

use url::form_urlencoded;

/// Encode `pairs` as `k1=v1&k2=v2`. Empty input yields an empty string.
pub fn form_encode<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// The query suffix for `params`: `?k=v&...`, or `""` when there are none.
pub fn query_string<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let encoded = form_encode(params);
    if encoded.is_empty() {
        encoded
    } else {
        format!("?{encoded}")
    }
}
