use std::sync::OnceLock;

use zuora_core::{
    AssociationInfo, FieldInfo, Model, Result, Rule, Schema, Transport,
};
use zuora_session::{HasMany, Session};

use super::Account;

const TERM_TYPES: &[&str] = &["TERMED", "EVERGREEN"];

pub(crate) fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("Subscription")
            .fields(&[
                FieldInfo::text("account_id"),
                FieldInfo::text("invoice_owner_id"),
                FieldInfo::text("name"),
                FieldInfo::text("notes"),
                FieldInfo::boolean("auto_renew"),
                FieldInfo::text("term_type"),
                FieldInfo::integer("initial_term"),
                FieldInfo::integer("renewal_term"),
                FieldInfo::date("term_start_date"),
                FieldInfo::date("term_end_date"),
                FieldInfo::datetime("contract_effective_date"),
                FieldInfo::datetime("contract_acceptance_date"),
                FieldInfo::datetime("service_activation_date"),
                FieldInfo::date("subscription_start_date"),
                FieldInfo::date("subscription_end_date").read_only(),
                FieldInfo::datetime("cancelled_date").read_only(),
                FieldInfo::text("status").read_only(),
                FieldInfo::integer("version").read_only(),
                FieldInfo::text("original_id").read_only(),
                FieldInfo::text("previous_subscription_id").read_only(),
                FieldInfo::text("created_by_id").read_only(),
                FieldInfo::datetime("created_date").read_only(),
                FieldInfo::text("updated_by_id").read_only(),
                FieldInfo::datetime("updated_date").read_only(),
            ])
            .association(AssociationInfo::belongs_to("account", "Account", "account_id"))
            .association(AssociationInfo::has_many("amendments", "Amendment"))
            .rules([
                Rule::presence("account_id"),
                Rule::max_length("name", 100).allow_nil(),
                Rule::boolean("auto_renew").allow_nil(),
                Rule::inclusion("term_type", TERM_TYPES).allow_nil(),
                Rule::numericality("initial_term").when_eq("term_type", "TERMED"),
                Rule::numericality("renewal_term").when_eq("term_type", "TERMED"),
                Rule::datetime("contract_effective_date").allow_nil(),
                Rule::datetime("contract_acceptance_date").allow_nil(),
                Rule::datetime("service_activation_date").allow_nil(),
                Rule::date("term_start_date").allow_nil(),
                Rule::date("subscription_start_date").allow_nil(),
            ])
            .build()
    })
}

record_type! {
    /// A subscription of an account to one or more rate plans.
    Subscription => schema
}

impl Subscription {
    accessors! {
        account_id / set_account_id: text => "account_id";
        invoice_owner_id / set_invoice_owner_id: text => "invoice_owner_id";
        name / set_name: text => "name";
        notes / set_notes: text => "notes";
        auto_renew / set_auto_renew: boolean => "auto_renew";
        term_type / set_term_type: text => "term_type";
        initial_term / set_initial_term: integer => "initial_term";
        renewal_term / set_renewal_term: integer => "renewal_term";
        term_start_date / set_term_start_date: date => "term_start_date";
        term_end_date / set_term_end_date: date => "term_end_date";
        contract_effective_date / set_contract_effective_date: datetime => "contract_effective_date";
        contract_acceptance_date / set_contract_acceptance_date: datetime => "contract_acceptance_date";
        service_activation_date / set_service_activation_date: datetime => "service_activation_date";
        subscription_start_date / set_subscription_start_date: date => "subscription_start_date";
    }

    readers! {
        subscription_end_date: date => "subscription_end_date";
        cancelled_date: datetime => "cancelled_date";
        status: text => "status";
        version: integer => "version";
        original_id: text => "original_id";
        previous_subscription_id: text => "previous_subscription_id";
        created_by_id: text => "created_by_id";
        created_date: datetime => "created_date";
        updated_by_id: text => "updated_by_id";
        updated_date: datetime => "updated_date";
    }

    /// The owning account, looked up once and then cached on this record.
    pub fn account<T: Transport>(&mut self, session: &mut Session<T>) -> Result<Option<Account>> {
        Ok(session
            .belongs_to(&mut self.record, "account")?
            .cloned()
            .map(Account::from_record))
    }

    pub fn set_account(&mut self, account: &Account) -> Result<&mut Self> {
        self.record
            .set_association("account", account.record().clone())?;
        Ok(self)
    }

    /// Amendments made to this subscription, re-queried on every fetch.
    pub fn amendments<T: Transport>(&self, session: &Session<T>) -> Result<HasMany> {
        session.has_many(&self.record, "amendments")
    }
}
