use std::collections::HashMap;

use crate::error::{BrainFlowError, Result};
use crate::message::Message;

/// 把节点产出的消息合并进对话日志
///
/// 已存在相同 `id` 的消息原位替换，其余按顺序追加。重复应用同一批消息结果不变。
pub fn merge_messages(existing: &mut Vec<Message>, incoming: Vec<Message>) -> Result<()> {
    if let Some(bad) = incoming.iter().find(|message| message.id.is_empty()) {
        return Err(BrainFlowError::MalformedUpdate(format!(
            "{:?} message without id",
            bad.role
        )));
    }

    let mut index: HashMap<String, usize> = existing
        .iter()
        .enumerate()
        .map(|(pos, message)| (message.id.clone(), pos))
        .collect();

    for message in incoming {
        match index.get(&message.id) {
            Some(&pos) => existing[pos] = message,
            None => {
                index.insert(message.id.clone(), existing.len());
                existing.push(message);
            }
        }
    }
    Ok(())
}

pub fn merged(existing: &[Message], incoming: &[Message]) -> Result<Vec<Message>> {
    let mut out = existing.to_vec();
    merge_messages(&mut out, incoming.to_vec())?;
    Ok(out)
}
