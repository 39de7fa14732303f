use tracing::warn;

use crate::error::Result;
use crate::message::Message;
use crate::state::{ContextKind, ConversationState};

/// Prompt 构建服务
///
/// 顺序固定：领域系统指令、可选的上下文强调、可选的上下文快照、已有消息。
pub struct PromptBuilder<'a> {
    instruction: &'a str,
    emphasis: Option<&'a str>,
    context: Option<(ContextKind, &'a str)>,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(instruction: &'a str) -> Self {
        Self {
            instruction,
            emphasis: None,
            context: None,
        }
    }

    pub fn emphasis(mut self, emphasis: Option<&'a str>) -> Self {
        self.emphasis = emphasis;
        self
    }

    /// 只渲染与 `kind` 匹配的上下文变体，标题如 `Resource Context`
    pub fn context(mut self, kind: Option<ContextKind>, heading: &'a str) -> Self {
        self.context = kind.map(|kind| (kind, heading));
        self
    }

    pub fn build(&self, state: &ConversationState) -> Result<Vec<Message>> {
        let mut prompt = Vec::with_capacity(state.messages.len() + 3);
        prompt.push(Message::system(self.instruction));

        if let Some((expected, heading)) = self.context {
            let actual = state.context.kind();
            let rendered = if actual == expected {
                state.context.render()?
            } else {
                if actual != ContextKind::None {
                    warn!(expected = ?expected, actual = ?actual, "domain context does not match handler, skipping");
                }
                None
            };

            // 带强调语的领域总是发送快照，没有上下文时为 null
            match (self.emphasis, rendered) {
                (Some(emphasis), rendered) => {
                    prompt.push(Message::system(emphasis));
                    let rendered = rendered.unwrap_or_else(|| "null".to_string());
                    prompt.push(Message::system(format!("{}: {}", heading, rendered)));
                }
                (None, Some(rendered)) => {
                    prompt.push(Message::system(format!("{}: {}", heading, rendered)));
                }
                (None, None) => {}
            }
        }

        prompt.extend(state.messages.iter().cloned());
        Ok(prompt)
    }
}
