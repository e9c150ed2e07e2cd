use crate::ipc::helpers::{
    get_optional_str, get_required_str, to_json, with_session, HandlerErr, SessionStore,
};
use crate::ipc::types::{AppState, Request};
use crate::model::SyllabusTopic;
use serde_json::json;

fn syllabus_list(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class = get_optional_str(params, "targetClass");
    let topics: Vec<&SyllabusTopic> = store
        .data()
        .syllabus_topics
        .iter()
        .filter(|t| class.as_deref().map_or(true, |c| t.target_class == c))
        .collect();
    Ok(json!({ "topics": to_json(&topics)? }))
}

fn syllabus_add(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let title = get_required_str(params, "title")?;
    if title.trim().is_empty() {
        return Err(HandlerErr::new("bad_params", "title must not be empty"));
    }
    let target_class = get_required_str(params, "targetClass")?;
    let topic = store.add_syllabus_topic(&title, &target_class)?;
    Ok(json!({ "topicId": topic.id, "topic": to_json(&topic)? }))
}

fn syllabus_toggle(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let topic_id = get_required_str(params, "topicId")?;
    let progress = store.toggle_syllabus_topic(&topic_id)?;
    let topic = store
        .data()
        .syllabus_topics
        .iter()
        .find(|t| t.id == topic_id)
        .ok_or_else(|| HandlerErr::new("not_found", "syllabus topic not found"))?;
    Ok(json!({
        "topicId": topic.id,
        "completed": topic.completed,
        "targetClass": topic.target_class,
        "classProgress": progress,
    }))
}

fn syllabus_delete(store: &mut SessionStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let topic_id = get_required_str(params, "topicId")?;
    store.delete_syllabus_topic(&topic_id)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "syllabus.list" => Some(with_session(state, req, syllabus_list)),
        "syllabus.add" => Some(with_session(state, req, syllabus_add)),
        "syllabus.toggle" => Some(with_session(state, req, syllabus_toggle)),
        "syllabus.delete" => Some(with_session(state, req, syllabus_delete)),
        _ => None,
    }
}
