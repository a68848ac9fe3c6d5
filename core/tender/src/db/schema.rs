table! {
    employee (id) {
        id -> Text,
        username -> Text,
        first_name -> Nullable<Text>,
        last_name -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

table! {
    organization (id) {
        id -> Text,
        name -> Text,
        description -> Nullable<Text>,
        organization_type -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

table! {
    organization_responsible (id) {
        id -> Integer,
        organization_id -> Text,
        user_id -> Text,
    }
}

table! {
    tender (id) {
        id -> Text,
        name -> Text,
        description -> Text,
        service_type -> Text,
        status -> Text,
        organization_id -> Text,
        version -> Integer,
        created_at -> Timestamp,
        creator_username -> Text,
    }
}

table! {
    tender_version (tender_id, version) {
        tender_id -> Text,
        version -> Integer,
        name -> Text,
        description -> Text,
        service_type -> Text,
        status -> Text,
        organization_id -> Text,
        created_at -> Timestamp,
        creator_username -> Text,
    }
}

table! {
    bid (id) {
        id -> Text,
        name -> Text,
        description -> Text,
        status -> Text,
        tender_id -> Text,
        author_type -> Text,
        author_id -> Text,
        organization_id -> Text,
        version -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    bid_version (bid_id, version) {
        bid_id -> Text,
        version -> Integer,
        name -> Text,
        description -> Text,
        status -> Text,
        tender_id -> Text,
        author_type -> Text,
        author_id -> Text,
        organization_id -> Text,
        created_at -> Timestamp,
    }
}

table! {
    bid_decision (bid_id, user_id) {
        bid_id -> Text,
        user_id -> Text,
        decision -> Text,
        created_at -> Timestamp,
    }
}

table! {
    bid_feedback (id) {
        id -> Text,
        bid_id -> Text,
        description -> Text,
        created_at -> Timestamp,
    }
}

joinable!(organization_responsible -> organization (organization_id));
joinable!(organization_responsible -> employee (user_id));
joinable!(tender -> organization (organization_id));
joinable!(bid -> tender (tender_id));
joinable!(bid_feedback -> bid (bid_id));

allow_tables_to_appear_in_same_query!(
    employee,
    organization,
    organization_responsible,
    tender,
    tender_version,
    bid,
    bid_version,
    bid_decision,
    bid_feedback,
);
