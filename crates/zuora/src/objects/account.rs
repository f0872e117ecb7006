use std::sync::OnceLock;

use zuora_core::{
    AssociationInfo, DefaultValue, FieldInfo, Record, Result, Rule, Schema, Transport,
    ValidationError, ValidationErrorKind,
};
use zuora_session::{HasMany, Session};

const STATUSES: &[&str] = &["Active", "Draft", "Canceled"];

const BATCHES: &[&str] = &[
    "Batch1", "Batch2", "Batch3", "Batch4", "Batch5", "Batch6", "Batch7", "Batch8", "Batch9",
    "Batch10", "Batch11", "Batch12", "Batch13", "Batch14", "Batch15", "Batch16", "Batch17",
    "Batch18", "Batch19", "Batch20",
];

fn bill_cycle_day_in_range(record: &Record, out: &mut Vec<ValidationError>) {
    let Some(day) = record.value("bill_cycle_day").as_i64() else {
        return;
    };
    let message = if day < 1 {
        "must be greater than or equal to 1"
    } else if day > 31 {
        "must be less than or equal to 31"
    } else {
        return;
    };
    out.push(ValidationError::new(
        "bill_cycle_day",
        ValidationErrorKind::Custom(message.to_string()),
    ));
}

pub(crate) fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("Account")
            .fields(&[
                FieldInfo::text("account_number"),
                FieldInfo::text("name"),
                FieldInfo::text("currency").default(DefaultValue::Text("USD")),
                FieldInfo::text("status").default(DefaultValue::Text("Draft")),
                FieldInfo::text("batch").default(DefaultValue::Text("Batch1")),
                FieldInfo::integer("bill_cycle_day").default(DefaultValue::Integer(1)),
                FieldInfo::text("payment_term").default(DefaultValue::Text("Due Upon Receipt")),
                FieldInfo::boolean("auto_pay").default(DefaultValue::Boolean(false)),
                FieldInfo::boolean("allow_invoice_edit"),
                FieldInfo::text("crm_id"),
                FieldInfo::text("notes"),
                FieldInfo::text("purchase_order_number"),
                FieldInfo::text("sales_rep_name"),
                FieldInfo::text("invoice_template_id"),
                FieldInfo::text("bill_to_id"),
                FieldInfo::text("sold_to_id"),
                FieldInfo::text("default_payment_method_id"),
                FieldInfo::text("parent_id"),
                FieldInfo::decimal("balance").read_only(),
                FieldInfo::date("last_invoice_date").read_only(),
                FieldInfo::text("created_by_id").read_only(),
                FieldInfo::datetime("created_date").read_only(),
                FieldInfo::text("updated_by_id").read_only(),
                FieldInfo::datetime("updated_date").read_only(),
            ])
            .association(AssociationInfo::has_many("subscriptions", "Subscription"))
            .rules([
                Rule::presence("name"),
                Rule::presence("currency"),
                Rule::presence("payment_term"),
                Rule::presence("batch"),
                Rule::presence("status"),
                Rule::max_length("name", 50),
                Rule::max_length("account_number", 50).allow_nil(),
                Rule::inclusion("status", STATUSES),
                Rule::inclusion("batch", BATCHES),
                Rule::numericality("bill_cycle_day"),
                Rule::custom(bill_cycle_day_in_range),
                Rule::boolean("auto_pay").allow_nil(),
            ])
            .build()
    })
}

record_type! {
    /// A customer account.
    Account => schema
}

impl Account {
    accessors! {
        account_number / set_account_number: text => "account_number";
        name / set_name: text => "name";
        currency / set_currency: text => "currency";
        status / set_status: text => "status";
        batch / set_batch: text => "batch";
        bill_cycle_day / set_bill_cycle_day: integer => "bill_cycle_day";
        payment_term / set_payment_term: text => "payment_term";
        auto_pay / set_auto_pay: boolean => "auto_pay";
        allow_invoice_edit / set_allow_invoice_edit: boolean => "allow_invoice_edit";
        crm_id / set_crm_id: text => "crm_id";
        notes / set_notes: text => "notes";
        purchase_order_number / set_purchase_order_number: text => "purchase_order_number";
        sales_rep_name / set_sales_rep_name: text => "sales_rep_name";
        invoice_template_id / set_invoice_template_id: text => "invoice_template_id";
        bill_to_id / set_bill_to_id: text => "bill_to_id";
        sold_to_id / set_sold_to_id: text => "sold_to_id";
        default_payment_method_id / set_default_payment_method_id: text => "default_payment_method_id";
        parent_id / set_parent_id: text => "parent_id";
    }

    readers! {
        balance: raw => "balance";
        last_invoice_date: date => "last_invoice_date";
        created_by_id: text => "created_by_id";
        created_date: datetime => "created_date";
        updated_by_id: text => "updated_by_id";
        updated_date: datetime => "updated_date";
    }

    /// Subscriptions owned by this account, re-queried on every fetch.
    pub fn subscriptions<T: Transport>(&self, session: &Session<T>) -> Result<HasMany> {
        session.has_many(&self.record, "subscriptions")
    }
}
