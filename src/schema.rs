diesel::table! {
    users (user_id) {
        user_id -> Integer,
        email -> Text,
        password -> Text,
    }
}

diesel::table! {
    srs_cards (card_id) {
        card_id -> Integer,
        user_id -> Integer,
        card_type -> Text,
        front -> Text,
        back -> Text,
        pinyin -> Nullable<Text>,
        example -> Nullable<Text>,
        notes -> Nullable<Text>,
        source_type -> Nullable<Text>,
        source_id -> Nullable<Integer>,
        ease_factor -> Double,
        interval_days -> Integer,
        repetitions -> Integer,
        due_at -> Timestamp,
        version -> Integer,
        created_at -> Timestamp,
    }
}

diesel::table! {
    srs_reviews (review_id) {
        review_id -> Integer,
        card_id -> Integer,
        user_id -> Integer,
        quality -> Integer,
        previous_interval -> Integer,
        new_interval -> Integer,
        previous_ease -> Double,
        new_ease -> Double,
        reviewed_at -> Timestamp,
    }
}

diesel::joinable!(srs_cards -> users (user_id));
diesel::joinable!(srs_reviews -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, srs_cards, srs_reviews);
