//! Amendment submission against a recording transport.

mod fixtures;

use chrono::{DateTime, NaiveDate};
use fixtures::*;
use zuora::Namespace;
use zuora::prelude::*;

/// An amendment attached to the canned subscription, status `Completed`, plus
/// the day after the subscription ends.
fn amendment_for_subscription(session: &Session<&MockTransport>) -> (Amendment, NaiveDate) {
    session.transport().responds_with(subscription_find_success());
    let subscription = Subscription::find_by_id(session, "stub")
        .unwrap()
        .expect("subscription fixture");
    let day_after_end = subscription
        .subscription_end_date()
        .and_then(|end| end.succ_opt())
        .expect("subscription end date");

    let mut amendment = Amendment::build();
    amendment.set_subscription(&subscription).unwrap();
    amendment.set_status("Completed");
    (amendment, day_after_end)
}

fn product_rate_plan(session: &Session<&MockTransport>) -> ProductRatePlan {
    session
        .transport()
        .responds_with(product_rate_plan_find_success());
    ProductRatePlan::find_by_id(session, "stub")
        .unwrap()
        .expect("product rate plan fixture")
}

const AMENDMENTS: [&str; 2] = ["requests", "Amendments"];

fn amendment_field<'a>(sent: &'a Sent, field: &str) -> Option<&'a str> {
    sent.text_at(&[AMENDMENTS[0], AMENDMENTS[1], field])
}

#[test]
fn terms_and_conditions_request() {
    let transport = MockTransport::new();
    let session = zuora::session(&transport);
    let (mut amendment, day_after_end) = amendment_for_subscription(&session);

    amendment
        .set_type("TermsAndConditions")
        .set_name("Change Terms")
        .set_contract_effective_date(day_after_end)
        .set_term_start_date(day_after_end)
        .set_initial_term(1)
        .set_renewal_term(1)
        .set_amend_options([("generate_invoice", false), ("process_payments", false)]);

    transport.responds_with(amendment_success());
    assert!(amendment.validate());
    assert!(amendment.create(&session).unwrap());

    let sent = transport.last();
    assert_eq!(sent.operation, "amend");
    assert_eq!(amendment_field(&sent, "Type"), Some("TermsAndConditions"));
    assert_eq!(amendment_field(&sent, "Status"), Some("Completed"));
    assert_eq!(
        amendment_field(&sent, "ContractEffectiveDate"),
        Some("2012-08-21T00:00:00+00:00")
    );
    assert_eq!(
        amendment_field(&sent, "TermStartDate"),
        Some("2012-08-21T00:00:00+00:00")
    );
    assert_eq!(amendment_field(&sent, "InitialTerm"), Some("1"));
    assert_eq!(amendment_field(&sent, "RenewalTerm"), Some("1"));
    assert_eq!(amendment_field(&sent, "Name"), Some("Change Terms"));
    assert_eq!(amendment_field(&sent, "SubscriptionId"), Some(SUBSCRIPTION_ID));
    assert_eq!(
        sent.text_at(&["requests", "AmendOptions", "GenerateInvoice"]),
        Some("false")
    );
    assert_eq!(
        sent.text_at(&["requests", "AmendOptions", "ProcessPayments"]),
        Some("false")
    );
}

#[test]
fn cancellation_request() {
    let transport = MockTransport::new();
    let session = zuora::session(&transport);
    let (mut amendment, day_after_end) = amendment_for_subscription(&session);

    amendment
        .set_type("Cancellation")
        .set_name("Cancel Subscription")
        .set_contract_effective_date(day_after_end)
        .set_effective_date(day_after_end);

    transport.responds_with(amendment_success());
    assert!(amendment.create(&session).unwrap());

    let sent = transport.last();
    assert_eq!(
        sent.xml(),
        format!(
            "<zns:requests><zns:Amendments>\
             <ons:SubscriptionId>{SUBSCRIPTION_ID}</ons:SubscriptionId>\
             <ons:Name>Cancel Subscription</ons:Name>\
             <ons:Type>Cancellation</ons:Type>\
             <ons:Status>Completed</ons:Status>\
             <ons:ContractEffectiveDate>2012-08-21T00:00:00+00:00</ons:ContractEffectiveDate>\
             <ons:EffectiveDate>2012-08-21T00:00:00+00:00</ons:EffectiveDate>\
             </zns:Amendments></zns:requests>"
        )
    );
}

#[test]
fn new_product_request_and_apply() {
    let transport = MockTransport::new();
    let session = zuora::session(&transport);
    let (mut amendment, _) = amendment_for_subscription(&session);
    let plan = product_rate_plan(&session);

    amendment
        .set_type("NewProduct")
        .set_name("Add Product")
        .set_product_rate_plan(&plan)
        .set_contract_effective_date(
            DateTime::parse_from_rfc3339("2012-07-20T10:10:27-04:00").unwrap(),
        )
        .set_amend_options([("generate_invoice", true), ("process_payments", false)]);

    transport.responds_with(amendment_success());
    assert!(amendment.validate());
    assert_eq!(amendment.submit(&session).unwrap(), SubmitState::Applied);

    let sent = transport.last();
    assert_eq!(amendment_field(&sent, "Type"), Some("NewProduct"));
    assert_eq!(amendment_field(&sent, "Status"), Some("Completed"));
    assert_eq!(amendment_field(&sent, "Name"), Some("Add Product"));
    assert_eq!(amendment_field(&sent, "SubscriptionId"), Some(SUBSCRIPTION_ID));
    assert_eq!(
        amendment_field(&sent, "ContractEffectiveDate"),
        Some("2012-07-20T10:10:27-04:00")
    );
    assert_eq!(
        sent.text_at(&[
            "requests",
            "Amendments",
            "RatePlanData",
            "RatePlan",
            "ProductRatePlanId"
        ]),
        Some(PRODUCT_RATE_PLAN_ID)
    );
    let rate_plan_data = sent
        .element_at(&["requests", "Amendments", "RatePlanData"])
        .unwrap();
    assert_eq!(rate_plan_data.namespace, Namespace::Api);
    assert_eq!(
        sent.text_at(&["requests", "AmendOptions", "GenerateInvoice"]),
        Some("true")
    );
    assert_eq!(
        sent.text_at(&["requests", "AmendOptions", "ProcessPayments"]),
        Some("false")
    );
    let options = sent.element_at(&["requests", "AmendOptions"]).unwrap();
    assert_eq!(options.namespace, Namespace::Api);
    assert!(options.children.iter().all(|c| c.namespace == Namespace::Api));

    assert_eq!(amendment.id(), Some(AMENDMENT_ID));
    assert!(!amendment.is_new());
    assert!(!amendment.record().has_changes());
    assert!(amendment.errors().is_empty());
    assert!(amendment.record().previously_changed().contains(&"type"));
}

#[test]
fn remove_product_request_uses_subscription_rate_plan_key() {
    let transport = MockTransport::new();
    let session = zuora::session(&transport);
    let (mut amendment, _) = amendment_for_subscription(&session);
    let plan = product_rate_plan(&session);

    amendment
        .set_type("RemoveProduct")
        .set_name("Remove Product")
        .set_product_rate_plan(&plan)
        .set_amend_options([("generate_invoice", false), ("process_payments", false)]);

    transport.responds_with(amendment_success());
    assert!(amendment.create(&session).unwrap());

    let sent = transport.last();
    assert_eq!(
        sent.text_at(&[
            "requests",
            "Amendments",
            "RatePlanData",
            "RatePlan",
            "AmendmentSubscriptionRatePlanId"
        ]),
        Some(PRODUCT_RATE_PLAN_ID)
    );
    assert!(
        sent.element_at(&["requests", "Amendments", "RatePlanData", "RatePlan", "ProductRatePlanId"])
            .is_none()
    );
}

#[test]
fn remote_rejection_lands_on_base() {
    let transport = MockTransport::new();
    let session = zuora::session(&transport);
    let (mut amendment, day_after_end) = amendment_for_subscription(&session);
    amendment
        .set_type("Cancellation")
        .set_name("Cancel Subscription")
        .set_contract_effective_date(day_after_end);

    transport.responds_with(amendment_failure());
    assert_eq!(amendment.submit(&session).unwrap(), SubmitState::Rejected);

    assert!(amendment.is_new());
    assert_eq!(amendment.id(), None);
    assert_eq!(
        amendment.errors().base(),
        &["The Contract effective date should not be later than the term end date.".to_string()]
    );
    assert!(amendment.record().is_dirty("name"));
    assert_eq!(
        amendment.errors().full_messages(),
        vec!["The Contract effective date should not be later than the term end date.".to_string()]
    );
}

#[test]
fn invalid_amendment_is_never_sent() {
    let transport = MockTransport::new();
    let session = zuora::session(&transport);

    let mut amendment = Amendment::build();
    amendment.set_type("TermsAndConditions");
    assert_eq!(amendment.submit(&session).unwrap(), SubmitState::Invalid);
    assert!(!amendment.create(&session).unwrap());

    assert_eq!(transport.count("amend"), 0);
    let errors = amendment.errors();
    assert!(errors.contains("subscription_id", "can't be blank"));
    assert!(errors.contains("name", "can't be blank"));
    assert!(errors.contains("term_start_date", "is not a valid date"));
    assert!(errors.contains("initial_term", "is not a number"));
    assert!(errors.contains("renewal_term", "is not a number"));
}

#[test]
fn unsaved_rate_plan_blocks_submission() {
    let transport = MockTransport::new();
    let session = zuora::session(&transport);
    let (mut amendment, _) = amendment_for_subscription(&session);

    amendment
        .set_type("NewProduct")
        .set_name("Add Product")
        .set_product_rate_plan(&ProductRatePlan::build());
    assert!(!amendment.create(&session).unwrap());
    assert!(amendment.errors().contains("product_rate_plan", "is invalid"));
    assert_eq!(transport.count("amend"), 0);
}

#[test]
fn rate_plan_written_as_plain_text_blocks_submission() {
    let transport = MockTransport::new();
    let session = zuora::session(&transport);
    let (mut amendment, _) = amendment_for_subscription(&session);

    amendment.set_type("NewProduct").set_name("Add Product");
    amendment
        .record_mut()
        .assign("product_rate_plan", PRODUCT_RATE_PLAN_ID)
        .assign("amend_options", "generate_invoice");

    assert_eq!(amendment.submit(&session).unwrap(), SubmitState::Invalid);
    assert!(amendment.errors().contains("product_rate_plan", "is invalid"));
    assert!(amendment.errors().contains("amend_options", "is invalid"));
    assert_eq!(transport.count("amend"), 0);
}

#[test]
fn transport_failure_propagates() {
    let transport = MockTransport::new();
    let session = zuora::session(&transport);
    let (mut amendment, day_after_end) = amendment_for_subscription(&session);
    amendment
        .set_type("Cancellation")
        .set_name("Cancel Subscription")
        .set_effective_date(day_after_end);

    transport.fails_with("connection reset by peer");
    let err = amendment.create(&session).unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(amendment.is_new());
    assert!(amendment.errors().is_empty());
}
