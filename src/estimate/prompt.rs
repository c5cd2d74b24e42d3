use super::client::ChatMessage;
use super::context::ContextBlock;

/// Fixes the model's role: a concise abatement-cost analyst that works from
/// the supplied records.
pub const SYSTEM_PROMPT: &str = "你是大气污染治理成本分析专家。请依据用户提供的历史单位治理成本数据，\
给出专业的成本估算和建议，回答尽量简洁。";

/// Build the two-message conversation for one estimate.
pub fn build_messages(context: &ContextBlock, industry: &str, pollutant: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt(context, industry, pollutant)),
    ]
}

fn user_prompt(context: &ContextBlock, industry: &str, pollutant: &str) -> String {
    let data = if context.is_empty() {
        "（没有匹配的历史记录）\n".to_string()
    } else {
        context.text.clone()
    };
    format!(
        "参考以下历史数据：\n{data}\n\
         请估算{industry}行业治理{pollutant}的单位治理成本（元/吨），\
         给出合理的成本范围及依据，并提出建议。"
    )
}
