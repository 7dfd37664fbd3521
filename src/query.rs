//! Query options for list-style reads.
//!
//! Only keys the caller set are sent. Keys are emitted in a fixed order, so
//! the same options always produce the same query string regardless of the
//! order the builder methods were called in.

/// Filters for `GET /invoices`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    /// Invoice status, e.g. `"VALIDATED"`, `"PROCESSING"`, `"ERROR"`.
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl InvoiceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// `(key, value)` pairs for the keys that were supplied.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "status", self.status.as_deref());
        push_number(&mut pairs, "limit", self.limit);
        push_number(&mut pairs, "offset", self.offset);
        pairs
    }
}

/// Filters for `GET /logs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub invoice_id: Option<String>,
    /// Log level, e.g. `"ERROR"`, `"INFO"`.
    pub level: Option<String>,
    pub limit: Option<u32>,
}

impl LogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invoice_id(mut self, id: impl Into<String>) -> Self {
        self.invoice_id = Some(id.into());
        self
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "invoiceId", self.invoice_id.as_deref());
        push_text(&mut pairs, "level", self.level.as_deref());
        push_number(&mut pairs, "limit", self.limit);
        pairs
    }
}

// Empty strings count as "not supplied": a key is never sent without a value.
fn push_text(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((key, v.to_string()));
    }
}

fn push_number(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<u32>) {
    if let Some(v) = value {
        pairs.push((key, v.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_has_no_pairs() {
        assert!(InvoiceQuery::new().to_pairs().is_empty());
        assert!(LogQuery::new().to_pairs().is_empty());
    }

    #[test]
    fn test_only_supplied_keys() {
        let pairs = InvoiceQuery::new().status("ERROR").to_pairs();
        assert_eq!(pairs, vec![("status", "ERROR".to_string())]);
    }

    #[test]
    fn test_order_insensitive() {
        let a = InvoiceQuery::new().offset(20).status("VALIDATED").limit(10);
        let b = InvoiceQuery::new().limit(10).status("VALIDATED").offset(20);
        assert_eq!(a.to_pairs(), b.to_pairs());
        assert_eq!(a.to_pairs(), a.to_pairs());
    }

    #[test]
    fn test_blank_text_not_sent() {
        let pairs = LogQuery::new().level("  ").invoice_id("").limit(10).to_pairs();
        assert_eq!(pairs, vec![("limit", "10".to_string())]);
    }

    #[test]
    fn test_zero_is_a_supplied_value() {
        let pairs = InvoiceQuery::new().offset(0).to_pairs();
        assert_eq!(pairs, vec![("offset", "0".to_string())]);
    }

    #[test]
    fn test_log_query_wire_names() {
        let pairs = LogQuery::new().invoice_id("inv-1").level("ERROR").to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("invoiceId", "inv-1".to_string()),
                ("level", "ERROR".to_string())
            ]
        );
    }
}
