use std::sync::OnceLock;

use zuora_core::{
    AssociationInfo, CodecSpec, DefaultValue, FieldInfo, Model, NestedReference, OperationSpec,
    OptionsSection, Record, RecordRef, ResponsePath, Result, Rule, Schema, Transport, Value,
};
use zuora_session::Session;

use super::{ProductRatePlan, Subscription};

const TYPES: &[&str] = &[
    "Cancellation",
    "NewProduct",
    "OwnerTransfer",
    "RemoveProduct",
    "Renewal",
    "UpdateProduct",
    "TermsAndConditions",
];

const STATUSES: &[&str] = &[
    "Completed",
    "Cancelled",
    "Draft",
    "Pending Acceptance",
    "Pending Activation",
];

const TERM_TYPES: &[&str] = &["TERMED", "EVERGREEN"];

/// Types that act on a product and so need a rate plan.
const PRODUCT_TYPES: &[&str] = &["NewProduct", "RemoveProduct", "UpdateProduct"];

/// Types that address a rate plan already on the subscription.
const EXISTING_PLAN_TYPES: &[&str] = &["RemoveProduct", "UpdateProduct"];

/// Key the rate plan id is sent under, given the amendment's type.
fn rate_plan_designation(record: &Record) -> &'static str {
    match record.value("type").as_str() {
        Some(kind) if EXISTING_PLAN_TYPES.contains(&kind) => "AmendmentSubscriptionRatePlanId",
        _ => "ProductRatePlanId",
    }
}

const AMEND: OperationSpec = OperationSpec {
    name: "amend",
    container: Some("requests"),
    section: "Amendments",
    typed: false,
    // amend is the one call that answers under `results`
    response: ResponsePath::new("amend_response", "results"),
};

pub(crate) fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("Amendment")
            .fields(&[
                FieldInfo::text("subscription_id"),
                FieldInfo::text("name"),
                FieldInfo::text("type"),
                FieldInfo::text("status").default(DefaultValue::Text("Draft")),
                FieldInfo::text("code"),
                FieldInfo::text("description"),
                FieldInfo::boolean("auto_renew"),
                FieldInfo::datetime("contract_effective_date"),
                FieldInfo::datetime("customer_acceptance_date"),
                FieldInfo::datetime("effective_date"),
                FieldInfo::datetime("service_activation_date"),
                FieldInfo::integer("initial_term"),
                FieldInfo::integer("renewal_term"),
                FieldInfo::date("term_start_date"),
                FieldInfo::text("term_type"),
                FieldInfo::text("destination_account_id"),
                FieldInfo::text("destination_invoice_owner_id"),
                FieldInfo::text("created_by_id").read_only(),
                FieldInfo::datetime("created_date").read_only(),
                FieldInfo::text("updated_by_id").read_only(),
                FieldInfo::datetime("updated_date").read_only(),
                FieldInfo::reference("product_rate_plan"),
                FieldInfo::options("amend_options"),
            ])
            .association(AssociationInfo::belongs_to(
                "subscription",
                "Subscription",
                "subscription_id",
            ))
            .rules([
                Rule::presence("subscription_id"),
                Rule::presence("name"),
                Rule::max_length("name", 100),
                Rule::boolean("auto_renew").allow_nil(),
                Rule::max_length("code", 50).allow_nil(),
                Rule::datetime("contract_effective_date").allow_nil(),
                Rule::datetime("customer_acceptance_date").allow_nil(),
                Rule::datetime("effective_date").allow_nil(),
                // STATUSES spells this "Pending Acceptance"; keep the unspaced trigger.
                Rule::datetime("service_activation_date").when_eq("status", "PendingAcceptance"),
                Rule::max_length("description", 500).allow_nil(),
                Rule::numericality("initial_term").when_eq("type", "TermsAndConditions"),
                Rule::numericality("renewal_term").when_eq("type", "TermsAndConditions"),
                Rule::date("term_start_date").when_eq("type", "TermsAndConditions"),
                Rule::presence("destination_account_id").when_eq("type", "OwnerTransfer"),
                Rule::presence("destination_invoice_owner_id").when_eq("type", "OwnerTransfer"),
                Rule::presence("product_rate_plan").when_in("type", PRODUCT_TYPES),
                Rule::inclusion("status", STATUSES),
                Rule::inclusion("term_type", TERM_TYPES).allow_nil(),
                Rule::inclusion("type", TYPES),
                Rule::existing("product_rate_plan"),
            ])
            .codec(CodecSpec {
                create: AMEND,
                nested_reference: Some(NestedReference {
                    field: "product_rate_plan",
                    path: &["RatePlanData", "RatePlan"],
                    designation: rate_plan_designation,
                }),
                options: Some(OptionsSection {
                    field: "amend_options",
                    section: "AmendOptions",
                }),
                ..CodecSpec::default()
            })
            .build()
    })
}

record_type! {
    /// A change to a subscription: new or removed product, new terms,
    /// cancellation, renewal or owner transfer.
    ///
    /// Created through the `amend` call rather than the generic `create`.
    Amendment => schema
}

impl Amendment {
    accessors! {
        subscription_id / set_subscription_id: text => "subscription_id";
        name / set_name: text => "name";
        amendment_type / set_type: text => "type";
        status / set_status: text => "status";
        code / set_code: text => "code";
        description / set_description: text => "description";
        auto_renew / set_auto_renew: boolean => "auto_renew";
        contract_effective_date / set_contract_effective_date: datetime => "contract_effective_date";
        customer_acceptance_date / set_customer_acceptance_date: datetime => "customer_acceptance_date";
        effective_date / set_effective_date: datetime => "effective_date";
        service_activation_date / set_service_activation_date: datetime => "service_activation_date";
        initial_term / set_initial_term: integer => "initial_term";
        renewal_term / set_renewal_term: integer => "renewal_term";
        term_start_date / set_term_start_date: date => "term_start_date";
        term_type / set_term_type: text => "term_type";
        destination_account_id / set_destination_account_id: text => "destination_account_id";
        destination_invoice_owner_id / set_destination_invoice_owner_id: text => "destination_invoice_owner_id";
    }

    readers! {
        created_by_id: text => "created_by_id";
        created_date: datetime => "created_date";
        updated_by_id: text => "updated_by_id";
        updated_date: datetime => "updated_date";
    }

    /// `AmendmentSubscriptionRatePlanId` for `RemoveProduct` and
    /// `UpdateProduct`, `ProductRatePlanId` otherwise.
    #[must_use]
    pub fn rate_plan_designation(&self) -> &'static str {
        rate_plan_designation(&self.record)
    }

    #[must_use]
    pub fn product_rate_plan(&self) -> Option<&RecordRef> {
        self.record.value("product_rate_plan").as_reference()
    }

    /// Point at a rate plan. Only its id is sent; a plan that has not been
    /// looked up or created fails validation.
    pub fn set_product_rate_plan(&mut self, plan: &ProductRatePlan) -> &mut Self {
        self.record.assign("product_rate_plan", plan.record().to_ref());
        self
    }

    #[must_use]
    pub fn amend_options(&self) -> &[(String, Value)] {
        self.record
            .value("amend_options")
            .as_options()
            .unwrap_or_default()
    }

    /// Replace the options sent alongside the amendment. Keys are snake_case.
    pub fn set_amend_options<K, V>(&mut self, options: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let entries = options
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.record.assign("amend_options", Value::Options(entries));
        self
    }

    /// The amended subscription, looked up once and then cached.
    pub fn subscription<T: Transport>(
        &mut self,
        session: &mut Session<T>,
    ) -> Result<Option<Subscription>> {
        Ok(session
            .belongs_to(&mut self.record, "subscription")?
            .cloned()
            .map(Subscription::from_record))
    }

    /// Attach to `subscription`, writing its id into `subscription_id`.
    pub fn set_subscription(&mut self, subscription: &Subscription) -> Result<&mut Self> {
        self.record
            .set_association("subscription", subscription.record().clone())?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted_plan() -> ProductRatePlan {
        let mut record = Record::hydrate(ProductRatePlan::schema(), Some("prp-1".to_string()));
        record.load("name", Value::from("Gold")).unwrap();
        ProductRatePlan::from_record(record)
    }

    #[test]
    fn test_new_amendment_defaults_to_draft() {
        let amendment = Amendment::build();
        assert_eq!(amendment.status(), Some("Draft"));
        assert!(amendment.is_new());
        assert!(amendment.record().is_dirty("status"));
        assert!(!amendment.record().is_dirty("created_date"));
    }

    #[test]
    fn test_malformed_datetimes() {
        let mut amendment = Amendment::build();
        amendment.set_status("PendingAcceptance");
        for field in [
            "contract_effective_date",
            "customer_acceptance_date",
            "effective_date",
            "service_activation_date",
        ] {
            amendment.record_mut().assign(field, "invalid");
            assert!(!amendment.validate());
            assert!(
                amendment.errors().contains(field, "is not a valid datetime"),
                "{field}"
            );
        }
    }

    #[test]
    fn test_malformed_term_start_outside_terms_and_conditions() {
        let mut amendment = Amendment::build();
        amendment.set_type("Cancellation").set_term_start_date("garbage");
        assert!(!amendment.validate());
        assert_eq!(
            amendment.errors().on("term_start_date"),
            &["is not a valid date".to_string()]
        );
    }

    #[test]
    fn test_service_activation_only_checked_when_pending() {
        let mut amendment = Amendment::build();
        amendment.validate();
        assert!(amendment.errors().on("service_activation_date").is_empty());
    }

    #[test]
    fn test_terms_and_conditions_constraints() {
        let mut amendment = Amendment::build();
        amendment.set_type("TermsAndConditions");
        assert!(!amendment.validate());
        let errors = amendment.errors();
        assert!(errors.contains("term_start_date", "is not a valid date"));
        assert!(errors.contains("initial_term", "is not a number"));
        assert!(errors.contains("renewal_term", "is not a number"));
    }

    #[test]
    fn test_cancellation_leaves_terms_unconstrained() {
        let mut amendment = Amendment::build();
        amendment.set_type("Cancellation");
        amendment.validate();
        let errors = amendment.errors();
        assert!(errors.on("term_start_date").is_empty());
        assert!(errors.on("initial_term").is_empty());
        assert!(errors.on("renewal_term").is_empty());
    }

    #[test]
    fn test_requires_name() {
        let mut amendment = Amendment::build();
        amendment.set_name(Value::Null);
        assert!(!amendment.validate());
        assert!(amendment.errors().contains("name", "can't be blank"));
    }

    #[test]
    fn test_name_length() {
        let mut amendment = Amendment::build();
        amendment.set_name("abcdefghijklmnopqrstuvwxyz".repeat(4));
        assert!(!amendment.validate());
        assert!(amendment
            .errors()
            .contains("name", "is too long (maximum is 100 characters)"));
    }

    #[test]
    fn test_product_types_require_rate_plan() {
        for kind in ["NewProduct", "RemoveProduct", "UpdateProduct"] {
            let mut amendment = Amendment::build();
            amendment.set_type(kind);
            assert!(!amendment.validate());
            assert!(amendment.errors().contains("product_rate_plan", "can't be blank"));
        }
    }

    #[test]
    fn test_owner_transfer_requires_destinations() {
        let mut amendment = Amendment::build();
        amendment.set_type("OwnerTransfer");
        amendment.validate();
        assert!(amendment.errors().contains("destination_account_id", "can't be blank"));
        assert!(amendment
            .errors()
            .contains("destination_invoice_owner_id", "can't be blank"));
    }

    #[test]
    fn test_unsaved_rate_plan_is_invalid() {
        let mut amendment = Amendment::build();
        amendment.set_product_rate_plan(&ProductRatePlan::build());
        assert!(!amendment.validate());
        assert!(amendment.errors().contains("product_rate_plan", "is invalid"));
    }

    #[test]
    fn test_persisted_rate_plan_is_accepted() {
        let mut amendment = Amendment::build();
        amendment.set_product_rate_plan(&persisted_plan());
        amendment.validate();
        assert!(amendment.errors().on("product_rate_plan").is_empty());
        assert_eq!(
            amendment.product_rate_plan().and_then(|r| r.id.as_deref()),
            Some("prp-1")
        );
    }

    #[test]
    fn test_rate_plan_designation() {
        let mut amendment = Amendment::build();
        amendment.set_type("RemoveProduct");
        assert_eq!(amendment.rate_plan_designation(), "AmendmentSubscriptionRatePlanId");
        assert_eq!(amendment.rate_plan_designation(), "AmendmentSubscriptionRatePlanId");

        amendment.set_type("UpdateProduct");
        assert_eq!(amendment.rate_plan_designation(), "AmendmentSubscriptionRatePlanId");

        amendment.set_type("AddProduct");
        assert_eq!(amendment.rate_plan_designation(), "ProductRatePlanId");
    }

    #[test]
    fn test_amend_options() {
        let mut amendment = Amendment::build();
        assert!(amendment.amend_options().is_empty());
        amendment.set_amend_options([("generate_invoice", true), ("process_payments", false)]);
        assert_eq!(
            amendment.amend_options(),
            &[
                ("generate_invoice".to_string(), Value::Bool(true)),
                ("process_payments".to_string(), Value::Bool(false)),
            ]
        );
    }

    #[test]
    fn test_set_subscription_marks_key_dirty() {
        let subscription = Subscription::from_record(Record::hydrate(
            Subscription::schema(),
            Some("4028e48834aa10a30134c9fcdf9f6764".to_string()),
        ));
        let mut amendment = Amendment::build();
        amendment.set_subscription(&subscription).unwrap();
        assert_eq!(
            amendment.subscription_id(),
            Some("4028e48834aa10a30134c9fcdf9f6764")
        );
        assert!(amendment.record().is_dirty("subscription_id"));
    }
}
