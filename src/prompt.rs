//! Prompt assembly for the two endpoints. Everything here is pure: given the
//! same form or transcript, the output payload is byte-identical, which is
//! what the unit tests lean on.

use crate::intake::{ConversationTurn, IntakeForm, Role};

/// The exact payload handed to the dispatcher: one system prompt plus the
/// ordered message list that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub system: String,
    pub messages: Vec<ConversationTurn>,
}

/// The knobs that differed between historical prompt revisions, carried as
/// data so a revision is a value change rather than a code branch.
#[derive(Debug, Clone)]
pub struct StyleRules {
    /// Persona line opening every system prompt.
    pub persona: String,
    /// Character ceiling for the generated first message.
    pub initial_char_limit: u32,
    /// Character ceiling for chat replies.
    pub chat_char_limit: u32,
    /// Exchange count from which replies must carry the contact URL.
    pub cta_threshold: u32,
    /// Contact page linked by the call-to-action.
    pub contact_url: String,
}

impl Default for StyleRules {
    fn default() -> Self {
        Self {
            persona: "あなたは熊本県のリフォーム会社「リホーム熊本」の親しみやすいリフォーム提案アシスタントです。"
                .to_string(),
            initial_char_limit: 300,
            chat_char_limit: 400,
            cta_threshold: 4,
            contact_url: "https://re-homekumamoto.com/contact/".to_string(),
        }
    }
}

/// Fixed user turn that asks for the opening message.
pub const KICKOFF_MESSAGE: &str = "初回メッセージをお願いします";

/// Shown to the user when the initial-message dispatch fails.
pub const INITIAL_FALLBACK: &str = "こんにちは！😊\nリフォーム提案アシスタントです。\n\nヒアリング内容を確認させていただき、\nあなたにぴったりのリフォームプランを\nご提案させていただきますね！\n\nまずは、どのような点を\n一番重視されたいでしょうか？\n\n1. 機能性・使いやすさ\n2. デザイン・見た目\n3. コストパフォーマンス\n\n番号でお答えください！🏠";

/// Shown to the user when a chat dispatch fails.
pub const CHAT_FALLBACK: &str = "申し訳ございません。😅\n一時的にエラーが発生しました。\n\nしばらくしてから再度お試しいただくか、\n以下からお選びください：\n\n1. もう一度質問する\n2. 別の話題に変える\n3. 直接お電話で相談する\n\nどちらがよろしいでしょうか？🏠";

const INITIAL_EXAMPLE: &str = "こんにちは！😊\nヒアリングありがとうございました。\n\n○○様のご家族構成とご希望を拝見させていただき、\nいくつかの素敵なプランが思い浮かびました！\n\n特におすすめしたいのは以下の3つです：\n\n1. △△を重視した機能的なリフォーム\n2. □□を活かしたデザイン重視のリフォーム\n3. ◇◇に配慮したバリアフリーリフォーム\n\nどちらに一番興味がおありでしょうか？🏠";

const CHAT_EXAMPLE: &str = "そうですね！😊\nキッチンのリフォームでしたら、\n熊本の湿気対策も大切ですね。\n\nあなたのご希望に合わせて、\nこんなプランはいかがでしょうか？\n\n1. 対面キッチンで家族との会話を重視\n2. アイランドキッチンで開放感を演出\n3. 壁付けキッチンで収納力をアップ\n\nどのスタイルがお気に入りでしょうか？🏠";

/// Build the system/user payload for the opening message.
///
/// Renders the persona, one labeled line per populated form field in a fixed
/// order, and the formatting-rules block with a worked example. Missing or
/// empty fields contribute nothing, so the customer-info block never carries
/// blank filler lines. Pets are the one exception: the line is always present
/// and reads "なし" when no pet is owned.
pub fn build_initial_prompt(form: &IntakeForm, rules: &StyleRules) -> PromptPayload {
    let profile = render_profile_lines(form);

    let system = format!(
        "{persona}\n\nお客様の情報:\n{profile}\n\n以下のルールに従って初回メッセージを作成してください:\n\n1. マークダウン記号（**、##、-、*など）は一切使用しない\n2. {limit}字以内で簡潔に\n3. 絵文字を適度に使用（1-3個程度）\n4. 改行を使って読みやすく\n5. 親しみやすく自然な会話調\n6. お客様の情報を踏まえた具体的な提案の方向性を3つ程度提示\n7. 番号付きの選択肢で終わる（1. 2. 3.の形式）\n\n例:\n{example}",
        persona = rules.persona,
        profile = profile.join("\n"),
        limit = rules.initial_char_limit,
        example = INITIAL_EXAMPLE,
    );

    PromptPayload {
        system,
        messages: vec![ConversationTurn {
            role: Role::User,
            content: KICKOFF_MESSAGE.to_string(),
        }],
    }
}

/// Build the system prompt for an ongoing chat and carry the caller's
/// transcript through untouched and in order.
///
/// From `turn_count >= cta_threshold` onward the system prompt additionally
/// instructs the model to close with the contact-URL call-to-action. This is
/// a monotonic threshold, not a modulus: once reached, every later turn
/// carries it.
pub fn build_chat_prompt(
    transcript: &[ConversationTurn],
    turn_count: u32,
    rules: &StyleRules,
) -> PromptPayload {
    let mut system = format!(
        "{persona}\n\n以下のルールに従って回答してください:\n\n1. マークダウン記号（**、##、-、*など）は一切使用しない\n2. {limit}字以内で簡潔に\n3. 絵文字を適度に使用\n4. 改行を使って読みやすく\n5. 親しみやすく自然な会話調\n6. リフォームの専門知識を活かした具体的なアドバイス\n7. 熊本の気候や住環境を考慮した提案\n8. 能動的に理想の具体的なリフォームプランを提案する\n9. できるだけ番号付きの選択肢で回答を求める（1. 2. 3.の形式）\n10. ユーザーが選択しやすいよう、具体的な選択肢を提示する\n\n回答例:\n{example}",
        persona = rules.persona,
        limit = rules.chat_char_limit,
        example = CHAT_EXAMPLE,
    );

    if turn_count >= rules.cta_threshold {
        system.push_str(&format!(
            "\n\n重要: {threshold}往復目以降は、回答の最後に自然な流れで以下のURL案内を含めてください:\n「より詳しいご相談は、こちらからお気軽にお問い合わせください\n{url}」\n\nこの案内は自然な会話の流れの中で、押し付けがましくなく案内してください。",
            threshold = rules.cta_threshold,
            url = rules.contact_url,
        ));
    }

    PromptPayload {
        system,
        messages: transcript.to_vec(),
    }
}

/// One labeled line per populated field, in the fixed hearing-sheet order.
fn render_profile_lines(form: &IntakeForm) -> Vec<String> {
    let mut lines = Vec::new();

    push_joined(&mut lines, "家族構成", &form.family_members);
    push_single(&mut lines, "年齢層", form.family_ages.main.as_deref());
    push_single(&mut lines, "住所", form.current_address.as_deref());
    push_single(&mut lines, "建物", form.building_type.as_deref());
    push_single(&mut lines, "築年数", form.building_age.as_deref());

    // Pets always render, so the model never invents pet-friendly plans
    // for a petless household.
    let owned = form.owned_pets();
    if owned.is_empty() {
        lines.push("ペット: なし".to_string());
    } else {
        lines.push(format!("ペット: {}", owned.join(", ")));
    }

    push_joined(&mut lines, "現在の不満", &form.current_issues);
    push_joined(&mut lines, "ライフスタイル", &form.lifestyle);
    push_joined(&mut lines, "趣味", &form.hobbies);
    push_joined(&mut lines, "好みのインテリア", &form.interior_styles);
    push_joined(&mut lines, "リフォーム希望箇所", &form.reform_areas);
    push_joined(&mut lines, "リフォームの理由", &form.reform_reasons);
    push_single(&mut lines, "予算", form.budget.as_deref());
    push_single(&mut lines, "時期", form.timeline.as_deref());
    push_single(&mut lines, "その他要望", form.other_requests.as_deref());

    lines
}

fn push_single(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        lines.push(format!("{label}: {value}"));
    }
}

fn push_joined(lines: &mut Vec<String>, label: &str, values: &[String]) {
    if !values.is_empty() {
        lines.push(format!("{label}: {}", values.join(", ")));
    }
}
