use std::sync::OnceLock;

use zuora_core::{FieldInfo, Rule, Schema};

pub(crate) fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("ProductRatePlan")
            .fields(&[
                FieldInfo::text("product_id"),
                FieldInfo::text("name"),
                FieldInfo::text("description"),
                FieldInfo::date("effective_start_date"),
                FieldInfo::date("effective_end_date"),
                FieldInfo::text("created_by_id").read_only(),
                FieldInfo::datetime("created_date").read_only(),
                FieldInfo::text("updated_by_id").read_only(),
                FieldInfo::datetime("updated_date").read_only(),
            ])
            .rules([
                Rule::presence("product_id"),
                Rule::presence("name"),
                Rule::max_length("name", 100),
                Rule::max_length("description", 500).allow_nil(),
                Rule::date("effective_start_date").allow_nil(),
                Rule::date("effective_end_date").allow_nil(),
            ])
            .build()
    })
}

record_type! {
    /// A priced plan of a product catalog entry.
    ///
    /// Amendments reference one by id; see
    /// [`Amendment::set_product_rate_plan`](super::Amendment::set_product_rate_plan).
    ProductRatePlan => schema
}

impl ProductRatePlan {
    accessors! {
        product_id / set_product_id: text => "product_id";
        name / set_name: text => "name";
        description / set_description: text => "description";
        effective_start_date / set_effective_start_date: date => "effective_start_date";
        effective_end_date / set_effective_end_date: date => "effective_end_date";
    }

    readers! {
        created_by_id: text => "created_by_id";
        created_date: datetime => "created_date";
        updated_by_id: text => "updated_by_id";
        updated_date: datetime => "updated_date";
    }
}
