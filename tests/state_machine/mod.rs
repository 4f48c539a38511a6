mod booking_flow;
mod check_in_flow;
mod music_mood_flow;
mod record_created_events;
mod submission_failures;
