use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use uuid::Uuid;

use crate::decimal::Money;
use crate::issues::{DataQualityIssue, IssueKind, IssueLog};
use crate::lifecycle::LifecycleStatus;
use crate::types::{BillingRecord, DateSpan, IssuedState, PaymentState, Tenant, TenantId};

/// a date as the document store delivers it
///
/// billing documents carry either plain ISO dates, RFC 3339 timestamps,
/// bare epoch seconds, or the store's wrapped `{ "seconds": n }` timestamp
/// objects. this is the single place all of them become `NaiveDate`; the
/// engine never sees anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Wrapped { seconds: i64 },
    EpochSeconds(i64),
    Text(String),
}

impl DateValue {
    /// normalize to a canonical date, `None` if unparseable
    pub fn as_naive_date(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Wrapped { seconds } | DateValue::EpochSeconds(seconds) => {
                DateTime::<Utc>::from_timestamp(*seconds, 0).map(|dt| dt.date_naive())
            }
            DateValue::Text(s) => {
                let s = s.trim();
                if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    return Some(date);
                }
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc).date_naive())
            }
        }
    }
}

/// an amount as the document store delivers it: number or numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountValue {
    Number(f64),
    Text(String),
}

impl AmountValue {
    /// tolerant parse to decimal, `None` if unparseable
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            AmountValue::Number(n) => Decimal::from_f64_retain(*n),
            AmountValue::Text(s) => Decimal::from_str(s.trim()).ok(),
        }
    }
}

/// raw tenant document from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantDocument {
    pub id: String,
    #[serde(default)]
    pub monthly_rate: Option<AmountValue>,
    pub status: LifecycleStatus,
    #[serde(default)]
    pub company: Option<String>,
}

/// raw billing document from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingDocument {
    pub id: String,
    pub tenant_id: String,
    #[serde(default)]
    pub coverage_start: Option<DateValue>,
    #[serde(default)]
    pub coverage_end: Option<DateValue>,
    #[serde(default)]
    pub face_amount: Option<AmountValue>,
    pub payment_state: PaymentState,
    pub issued_state: IssuedState,
}

impl BillingDocument {
    /// best-effort valuation for exclusion reports
    fn reported_amount(&self) -> Option<Money> {
        self.face_amount
            .as_ref()
            .and_then(|a| a.to_decimal())
            .map(Money::from_decimal)
    }
}

/// normalize tenant documents into the typed model
///
/// malformed documents are excluded and reported, never zeroed: a tenant
/// with no usable rate cannot have rent recognized against it.
pub fn normalize_tenants(documents: &[TenantDocument], issues: &mut IssueLog) -> Vec<Tenant> {
    let mut tenants = Vec::with_capacity(documents.len());

    for doc in documents {
        let id = match Uuid::parse_str(doc.id.trim()) {
            Ok(id) => id,
            Err(_) => {
                issues.record(DataQualityIssue {
                    record: None,
                    tenant: None,
                    kind: IssueKind::UnparseableId,
                    detail: format!("tenant id {:?} is not a uuid", doc.id),
                    excluded_amount: None,
                });
                continue;
            }
        };

        let rate = doc.monthly_rate.as_ref().and_then(|a| a.to_decimal());
        let rate = match rate {
            Some(r) => Money::from_decimal(r),
            None => {
                issues.record(DataQualityIssue {
                    record: None,
                    tenant: Some(id),
                    kind: IssueKind::UnparseableAmount,
                    detail: "tenant has no parseable monthly rate".to_string(),
                    excluded_amount: None,
                });
                continue;
            }
        };

        if !rate.is_positive() {
            issues.record(DataQualityIssue {
                record: None,
                tenant: Some(id),
                kind: IssueKind::NonPositiveRate,
                detail: format!("monthly rate {} is not positive", rate),
                excluded_amount: None,
            });
            continue;
        }

        tenants.push(Tenant {
            id,
            monthly_rate: rate,
            status: doc.status,
            company: doc.company.clone(),
        });
    }

    tenants
}

/// normalize billing documents into typed records
///
/// `eligible_rates` holds the tenants allocation will run for; `known`
/// holds every tenant id that exists in the snapshot. a record pointing at
/// a known-but-ineligible tenant is a business rule, not a data problem,
/// and is skipped quietly; a record pointing nowhere is a dangling
/// reference and is reported.
pub fn normalize_records(
    documents: &[BillingDocument],
    eligible_rates: &BTreeMap<TenantId, Money>,
    known: &BTreeSet<TenantId>,
    issues: &mut IssueLog,
) -> Vec<BillingRecord> {
    let mut records = Vec::with_capacity(documents.len());

    for doc in documents {
        let record_id = match Uuid::parse_str(doc.id.trim()) {
            Ok(id) => id,
            Err(_) => {
                issues.record(DataQualityIssue {
                    record: None,
                    tenant: None,
                    kind: IssueKind::UnparseableId,
                    detail: format!("record id {:?} is not a uuid", doc.id),
                    excluded_amount: doc.reported_amount(),
                });
                continue;
            }
        };

        let tenant_id = match Uuid::parse_str(doc.tenant_id.trim()) {
            Ok(id) => id,
            Err(_) => {
                issues.record(DataQualityIssue {
                    record: Some(record_id),
                    tenant: None,
                    kind: IssueKind::UnparseableId,
                    detail: format!("tenant id {:?} is not a uuid", doc.tenant_id),
                    excluded_amount: doc.reported_amount(),
                });
                continue;
            }
        };

        if !known.contains(&tenant_id) {
            issues.record(DataQualityIssue {
                record: Some(record_id),
                tenant: Some(tenant_id),
                kind: IssueKind::UnknownTenant,
                detail: "record references a tenant not in the snapshot".to_string(),
                excluded_amount: doc.reported_amount(),
            });
            continue;
        }

        if !eligible_rates.contains_key(&tenant_id) {
            debug!(
                "skipping record {} for ineligible tenant {}",
                record_id, tenant_id
            );
            continue;
        }

        let (start, end) = match normalize_coverage(doc, record_id, tenant_id, issues) {
            Some(bounds) => bounds,
            None => continue,
        };

        let coverage = match DateSpan::new(start, end) {
            Ok(span) => span,
            Err(_) => {
                issues.record(DataQualityIssue {
                    record: Some(record_id),
                    tenant: Some(tenant_id),
                    kind: IssueKind::InvertedCoverage,
                    detail: format!("coverage start {} is after end {}", start, end),
                    excluded_amount: doc.reported_amount(),
                });
                continue;
            }
        };

        let face_amount = match &doc.face_amount {
            None => Money::ZERO,
            Some(raw) => match raw.to_decimal() {
                Some(d) => Money::from_decimal(d),
                None => {
                    issues.record(DataQualityIssue {
                        record: Some(record_id),
                        tenant: Some(tenant_id),
                        kind: IssueKind::UnparseableAmount,
                        detail: "face amount is not a number".to_string(),
                        excluded_amount: None,
                    });
                    continue;
                }
            },
        };

        if face_amount.is_negative() {
            issues.record(DataQualityIssue {
                record: Some(record_id),
                tenant: Some(tenant_id),
                kind: IssueKind::NegativeFaceAmount,
                detail: format!("face amount {} is negative", face_amount),
                excluded_amount: Some(face_amount),
            });
            continue;
        }

        records.push(BillingRecord {
            id: record_id,
            tenant_id,
            coverage,
            face_amount,
            payment_state: doc.payment_state,
            issued_state: doc.issued_state,
        });
    }

    records
}

fn normalize_coverage(
    doc: &BillingDocument,
    record_id: Uuid,
    tenant_id: TenantId,
    issues: &mut IssueLog,
) -> Option<(NaiveDate, NaiveDate)> {
    let mut missing = Vec::new();
    let mut unparseable = Vec::new();

    let mut bound = |field: &str, value: &Option<DateValue>| match value {
        None => {
            missing.push(field.to_string());
            None
        }
        Some(raw) => match raw.as_naive_date() {
            Some(date) => Some(date),
            None => {
                unparseable.push(field.to_string());
                None
            }
        },
    };

    let start = bound("coverageStart", &doc.coverage_start);
    let end = bound("coverageEnd", &doc.coverage_end);

    if !missing.is_empty() {
        issues.record(DataQualityIssue {
            record: Some(record_id),
            tenant: Some(tenant_id),
            kind: IssueKind::MissingCoverageDate,
            detail: format!("missing {}", missing.join(", ")),
            excluded_amount: doc.reported_amount(),
        });
        return None;
    }

    if !unparseable.is_empty() {
        issues.record(DataQualityIssue {
            record: Some(record_id),
            tenant: Some(tenant_id),
            kind: IssueKind::UnparseableDate,
            detail: format!("unparseable {}", unparseable.join(", ")),
            excluded_amount: doc.reported_amount(),
        });
        return None;
    }

    Some((start?, end?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant_doc(id: &str, rate: Option<AmountValue>, status: LifecycleStatus) -> TenantDocument {
        TenantDocument {
            id: id.to_string(),
            monthly_rate: rate,
            status,
            company: None,
        }
    }

    fn billing_doc(tenant_id: &str) -> BillingDocument {
        BillingDocument {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            coverage_start: Some(DateValue::Text("2024-03-01".to_string())),
            coverage_end: Some(DateValue::Text("2024-03-31".to_string())),
            face_amount: Some(AmountValue::Number(3_500.0)),
            payment_state: PaymentState::Unpaid,
            issued_state: IssuedState::Issued,
        }
    }

    #[test]
    fn test_date_value_normalizes_every_shape() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let iso = DateValue::Text("2024-03-15".to_string());
        assert_eq!(iso.as_naive_date(), Some(expected));

        let rfc = DateValue::Text("2024-03-15T09:30:00Z".to_string());
        assert_eq!(rfc.as_naive_date(), Some(expected));

        // 2024-03-15 00:00:00 utc
        let epoch = DateValue::EpochSeconds(1_710_460_800);
        assert_eq!(epoch.as_naive_date(), Some(expected));

        let wrapped = DateValue::Wrapped {
            seconds: 1_710_460_800,
        };
        assert_eq!(wrapped.as_naive_date(), Some(expected));

        let garbage = DateValue::Text("next tuesday".to_string());
        assert_eq!(garbage.as_naive_date(), None);
    }

    #[test]
    fn test_date_value_deserializes_untagged() {
        let wrapped: DateValue = serde_json::from_str(r#"{"seconds": 1710460800}"#).unwrap();
        assert_eq!(
            wrapped,
            DateValue::Wrapped {
                seconds: 1_710_460_800
            }
        );

        let epoch: DateValue = serde_json::from_str("1710460800").unwrap();
        assert_eq!(epoch, DateValue::EpochSeconds(1_710_460_800));

        let text: DateValue = serde_json::from_str(r#""2024-03-15""#).unwrap();
        assert_eq!(text, DateValue::Text("2024-03-15".to_string()));
    }

    #[test]
    fn test_amount_value_tolerates_strings() {
        assert_eq!(
            AmountValue::Text(" 3500.50 ".to_string()).to_decimal(),
            Some(Decimal::from_str("3500.50").unwrap())
        );
        assert_eq!(
            AmountValue::Number(1_200.0).to_decimal(),
            Some(Decimal::from(1_200))
        );
        assert_eq!(AmountValue::Text("n/a".to_string()).to_decimal(), None);
    }

    #[test]
    fn test_tenant_normalization_excludes_and_reports() {
        let good = Uuid::new_v4();
        let docs = vec![
            tenant_doc(
                &good.to_string(),
                Some(AmountValue::Text("3500".to_string())),
                LifecycleStatus::Housed,
            ),
            tenant_doc("not-a-uuid", Some(AmountValue::Number(100.0)), LifecycleStatus::Housed),
            tenant_doc(&Uuid::new_v4().to_string(), None, LifecycleStatus::Housed),
            tenant_doc(
                &Uuid::new_v4().to_string(),
                Some(AmountValue::Number(-50.0)),
                LifecycleStatus::Housed,
            ),
        ];

        let mut issues = IssueLog::new();
        let tenants = normalize_tenants(&docs, &mut issues);

        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].id, good);
        assert_eq!(tenants[0].monthly_rate, Money::from_major(3_500));

        let kinds: Vec<IssueKind> = issues.issues().iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::UnparseableId,
                IssueKind::UnparseableAmount,
                IssueKind::NonPositiveRate,
            ]
        );
    }

    #[test]
    fn test_record_missing_dates_reported_with_face_amount() {
        let tenant = Uuid::new_v4();
        let rates: BTreeMap<TenantId, Money> =
            [(tenant, Money::from_major(3_500))].into_iter().collect();
        let known: BTreeSet<TenantId> = [tenant].into_iter().collect();

        let mut doc = billing_doc(&tenant.to_string());
        doc.coverage_end = None;

        let mut issues = IssueLog::new();
        let records = normalize_records(&[doc], &rates, &known, &mut issues);

        assert!(records.is_empty());
        assert_eq!(issues.len(), 1);
        let issue = &issues.issues()[0];
        assert_eq!(issue.kind, IssueKind::MissingCoverageDate);
        // excluded money stays visible
        assert_eq!(issue.excluded_amount, Some(Money::from_major(3_500)));
    }

    #[test]
    fn test_record_inverted_coverage_reported() {
        let tenant = Uuid::new_v4();
        let rates: BTreeMap<TenantId, Money> =
            [(tenant, Money::from_major(3_500))].into_iter().collect();
        let known: BTreeSet<TenantId> = [tenant].into_iter().collect();

        let mut doc = billing_doc(&tenant.to_string());
        doc.coverage_start = Some(DateValue::Text("2024-04-10".to_string()));
        doc.coverage_end = Some(DateValue::Text("2024-04-01".to_string()));

        let mut issues = IssueLog::new();
        let records = normalize_records(&[doc], &rates, &known, &mut issues);

        assert!(records.is_empty());
        assert_eq!(issues.issues()[0].kind, IssueKind::InvertedCoverage);
    }

    #[test]
    fn test_unknown_tenant_is_issue_but_ineligible_is_not() {
        let eligible = Uuid::new_v4();
        let ineligible = Uuid::new_v4();
        let rates: BTreeMap<TenantId, Money> =
            [(eligible, Money::from_major(1_000))].into_iter().collect();
        let known: BTreeSet<TenantId> = [eligible, ineligible].into_iter().collect();

        let docs = vec![
            billing_doc(&eligible.to_string()),
            billing_doc(&ineligible.to_string()),
            billing_doc(&Uuid::new_v4().to_string()), // dangling reference
        ];

        let mut issues = IssueLog::new();
        let records = normalize_records(&docs, &rates, &known, &mut issues);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tenant_id, eligible);
        // only the dangling reference is a data-quality issue
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.issues()[0].kind, IssueKind::UnknownTenant);
    }

    #[test]
    fn test_document_wire_shape_is_camel_case() {
        let json = r#"{
            "id": "7b3e1f58-6f9e-4f2a-8a36-0f6d36d9b3a1",
            "tenantId": "f0a9c2d4-1b2c-4d5e-9f8a-7b6c5d4e3f21",
            "coverageStart": "2024-03-01",
            "coverageEnd": {"seconds": 1711843200},
            "faceAmount": "3500",
            "paymentState": "paid",
            "issuedState": "issued"
        }"#;

        let doc: BillingDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.payment_state, PaymentState::Paid);
        assert_eq!(
            doc.coverage_start.unwrap().as_naive_date(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            doc.coverage_end.unwrap().as_naive_date(),
            NaiveDate::from_ymd_opt(2024, 3, 31)
        );
    }
}
