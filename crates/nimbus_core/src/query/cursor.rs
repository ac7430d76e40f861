//! Paging tokens.
//!
//! A token records the last document returned plus a fingerprint of the
//! query that produced it:
//!
//! ```text
//! base64url( CBOR { v: 1, fp: sha256(secret, scope, expressions), id, parent } )
//! ```
//!
//! The secret is per store, so tokens cannot be forged, and the fingerprint
//! ties a token to one scope and filter set.

use super::expression::Expression;
use crate::document::Document;
use crate::error::{CoreError, CoreResult};
use crate::key::Key;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

const TOKEN_VERSION: u8 = 1;

/// Size of the per-store token secret.
pub(crate) const SECRET_SIZE: usize = 32;

/// Opaque continuation token returned by paginated queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PagingToken(String);

impl PagingToken {
    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the empty token, which means "start from the beginning".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for PagingToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PagingToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PagingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize)]
struct CursorState {
    v: u8,
    fp: Vec<u8>,
    id: String,
    parent: Option<String>,
}

/// Slices ordered results into pages and mints/verifies tokens.
pub(crate) struct Paginator {
    secret: [u8; SECRET_SIZE],
}

impl Paginator {
    pub(crate) fn new(secret: [u8; SECRET_SIZE]) -> Self {
        Self { secret }
    }

    /// Fingerprint of a query's scope and filters.
    pub(crate) fn fingerprint(
        &self,
        key: &Key,
        sub_collection: &str,
        expressions: &[Expression],
    ) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.secret);
        for part in [key.collection.as_str(), key.id.as_str(), sub_collection] {
            update_framed(&mut hasher, part.as_bytes());
        }
        for expression in expressions {
            update_framed(&mut hasher, expression.operand.as_bytes());
            update_framed(&mut hasher, expression.operator.as_str().as_bytes());
            update_framed(&mut hasher, expression.value.to_string().as_bytes());
        }
        hasher.finalize().into()
    }

    /// Returns the page of `results` following `token`, and the token for
    /// the page after it.
    ///
    /// `limit == 0` returns everything with no token.
    ///
    /// # Errors
    ///
    /// Returns `PagingToken` if `token` is malformed or was minted for a
    /// different query.
    pub(crate) fn paginate(
        &self,
        results: Vec<Document>,
        limit: usize,
        token: Option<&PagingToken>,
        fingerprint: &[u8; 32],
    ) -> CoreResult<(Vec<Document>, Option<PagingToken>)> {
        if limit == 0 {
            return Ok((results, None));
        }

        let position = match token.filter(|t| !t.is_empty()) {
            Some(token) => Some(self.decode(token, fingerprint)?),
            None => None,
        };

        let mut page: Vec<Document> = results
            .into_iter()
            .skip_while(|doc| match &position {
                Some((id, parent)) => doc.sort_key() <= (id.as_str(), parent.as_deref()),
                None => false,
            })
            .take(limit + 1)
            .collect();

        let next = if page.len() > limit {
            page.truncate(limit);
            page.last()
                .map(|last| self.encode(last, fingerprint))
                .transpose()?
        } else {
            None
        };

        Ok((page, next))
    }

    fn encode(&self, last: &Document, fingerprint: &[u8; 32]) -> CoreResult<PagingToken> {
        let state = CursorState {
            v: TOKEN_VERSION,
            fp: fingerprint.to_vec(),
            id: last.key.id.clone(),
            parent: last.parent.as_ref().map(|p| p.id.clone()),
        };
        let mut bytes = Vec::new();
        ciborium::into_writer(&state, &mut bytes)
            .map_err(|e| CoreError::paging_token(format!("encode failed: {e}")))?;
        Ok(PagingToken(URL_SAFE_NO_PAD.encode(bytes)))
    }

    fn decode(
        &self,
        token: &PagingToken,
        fingerprint: &[u8; 32],
    ) -> CoreResult<(String, Option<String>)> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.as_str())
            .map_err(|_| CoreError::paging_token("not a token"))?;
        let state: CursorState = ciborium::from_reader(bytes.as_slice())
            .map_err(|_| CoreError::paging_token("undecodable token"))?;

        if state.v != TOKEN_VERSION {
            return Err(CoreError::paging_token(format!(
                "unsupported token version {}",
                state.v
            )));
        }
        if state.fp.as_slice() != fingerprint.as_slice() {
            return Err(CoreError::paging_token(
                "token was issued for a different query",
            ));
        }

        Ok((state.id, state.parent))
    }
}

fn update_framed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Operator;

    fn docs(n: usize) -> Vec<Document> {
        (1..=n)
            .map(|i| Document {
                key: Key::new("items", format!("{i:02}")),
                parent: None,
                content: Default::default(),
            })
            .collect()
    }

    fn ids(page: &[Document]) -> Vec<&str> {
        page.iter().map(|d| d.key.id.as_str()).collect()
    }

    fn paginator() -> Paginator {
        Paginator::new([7u8; SECRET_SIZE])
    }

    #[test]
    fn unlimited_returns_everything() {
        let p = paginator();
        let fp = p.fingerprint(&Key::collection("items"), "", &[]);
        let (page, token) = p.paginate(docs(12), 0, None, &fp).unwrap();
        assert_eq!(page.len(), 12);
        assert!(token.is_none());
    }

    #[test]
    fn pages_resume_without_gaps_or_duplicates() {
        let p = paginator();
        let fp = p.fingerprint(&Key::collection("items"), "", &[]);

        let (first, token) = p.paginate(docs(12), 10, None, &fp).unwrap();
        assert_eq!(first.len(), 10);
        let token = token.expect("more pages");

        let (second, token) = p.paginate(docs(12), 10, Some(&token), &fp).unwrap();
        assert_eq!(ids(&second), vec!["11", "12"]);
        assert!(token.is_none());
    }

    #[test]
    fn exact_fit_has_no_token() {
        let p = paginator();
        let fp = p.fingerprint(&Key::collection("items"), "", &[]);
        let (page, token) = p.paginate(docs(4), 4, None, &fp).unwrap();
        assert_eq!(page.len(), 4);
        assert!(token.is_none());
    }

    #[test]
    fn empty_token_starts_from_beginning() {
        let p = paginator();
        let fp = p.fingerprint(&Key::collection("items"), "", &[]);
        let (page, _) = p
            .paginate(docs(3), 2, Some(&PagingToken::from("")), &fp)
            .unwrap();
        assert_eq!(ids(&page), vec!["01", "02"]);
    }

    #[test]
    fn resume_survives_deleted_anchor() {
        let p = paginator();
        let fp = p.fingerprint(&Key::collection("items"), "", &[]);
        let (_, token) = p.paginate(docs(6), 3, None, &fp).unwrap();

        let mut remaining = docs(6);
        remaining.remove(2); // "03" was the last returned
        let (page, _) = p.paginate(remaining, 3, token.as_ref(), &fp).unwrap();
        assert_eq!(ids(&page), vec!["04", "05", "06"]);
    }

    #[test]
    fn token_is_bound_to_filters() {
        let p = paginator();
        let all = p.fingerprint(&Key::collection("items"), "", &[]);
        let filtered = p.fingerprint(
            &Key::collection("items"),
            "",
            &[Expression::new("letter", Operator::Gt, "D")],
        );
        let (_, token) = p.paginate(docs(6), 2, None, &all).unwrap();

        let err = p
            .paginate(docs(6), 2, token.as_ref(), &filtered)
            .unwrap_err();
        assert!(err.is_paging_token());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let a = Paginator::new([1u8; SECRET_SIZE]);
        let b = Paginator::new([2u8; SECRET_SIZE]);
        let key = Key::collection("items");
        let (_, token) = a
            .paginate(docs(6), 2, None, &a.fingerprint(&key, "", &[]))
            .unwrap();

        let err = b
            .paginate(docs(6), 2, token.as_ref(), &b.fingerprint(&key, "", &[]))
            .unwrap_err();
        assert!(err.is_paging_token());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let p = paginator();
        let fp = p.fingerprint(&Key::collection("items"), "", &[]);
        for garbage in ["!!!", "AAAA", "bm90IGNib3I"] {
            let err = p
                .paginate(docs(3), 2, Some(&PagingToken::from(garbage)), &fp)
                .unwrap_err();
            assert!(err.is_paging_token(), "{garbage}");
        }
    }

    #[test]
    fn scope_parts_are_framed() {
        let p = paginator();
        let a = p.fingerprint(&Key::new("ab", "c"), "", &[]);
        let b = p.fingerprint(&Key::new("a", "bc"), "", &[]);
        assert_ne!(a, b);
    }
}
