//! The correction prompt sent to the chat completion service.

use crate::core::dictionary::Dictionary;

/// Correction policy given to the model as the system message.
pub const SYSTEM_PROMPT: &str = "\
あなたはプロフェッショナルな文字起こしアシスタントです。以下の文字起こしデータを読みやすく整形してください。

条件:
- 元の音声を可能な限り忠実に文字化してください。
- 「あの」「えー」などの不要なフィラーやノイズを削除し、新しい情報を追加しないでください。
- 文脈を保持しながら、テキストを統一して読みやすくしてください。
- カタカナ英語（ケース、プラン、パターン、リハ、リハビリなど）はそのまま保持してください。
- テキストを読みやすいように論理的な段落に分けてください。
- タイムスタンプがある場合は、そのまま残してください。";

/// Cap on dictionary entries embedded in the prompt. This bounds the
/// context window cost of the dictionary section; it is not a relevance
/// filter.
pub const MAX_DICTIONARY_EXAMPLES: usize = 50;

/// Build the system message, appending a dictionary excerpt when one is
/// available.
///
/// Each entry is included verbatim as a worked `reading → canonical form`
/// example, followed by an instruction to apply the same pattern to terms
/// the excerpt does not cover.
pub fn build_system_prompt(dictionary: &Dictionary) -> String {
    if dictionary.is_empty() {
        return SYSTEM_PROMPT.to_string();
    }

    let mut prompt = String::from(SYSTEM_PROMPT);
    prompt.push_str("\n\n専門用語辞書（読み → 正式表記）:\n");
    for (reading, canonical) in dictionary.iter().take(MAX_DICTIONARY_EXAMPLES) {
        prompt.push_str("- ");
        prompt.push_str(reading);
        prompt.push_str(" → ");
        prompt.push_str(canonical);
        prompt.push('\n');
    }
    prompt.push_str(
        "上記の読みが文字起こしに現れた場合は正式表記へ置き換えてください。\
辞書にない専門用語についても、同じ読み→正式表記の変換パターンを適用してください。",
    );
    prompt
}
