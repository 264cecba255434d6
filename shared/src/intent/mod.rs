//! Intent 模块 - 统一的变更分发
//!
//! 每个资源的写操作都表达为一个 [`CrudAction`]，由控制器分发。

use serde::{Deserialize, Serialize};

/// 通用 CRUD 操作
///
/// 泛型参数：
/// - `C`: Create 数据类型
/// - `U`: Update 数据类型 (通常字段为 Option)
///
/// ```json
/// { "type": "Update", "data": { "id": "a", "data": { "salary": 500 } } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CrudAction<C, U> {
    /// 创建
    Create(C),
    /// 更新 (需要 ID 和部分数据)
    Update { id: String, data: U },
    /// 删除 (只需要 ID)
    Delete { id: String },
}

impl<C, U> CrudAction<C, U> {
    /// 操作名称，用于日志
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    /// 目标记录 ID (创建时为空)
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Create(_) => None,
            Self::Update { id, .. } | Self::Delete { id } => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Salary {
        salary: i64,
    }

    #[test]
    fn test_update_json_shape() {
        let action: CrudAction<(), Salary> = serde_json::from_str(
            r#"{"type":"Update","data":{"id":"a","data":{"salary":500}}}"#,
        )
        .unwrap();

        assert_eq!(action.verb(), "update");
        assert_eq!(action.target(), Some("a"));
        match action {
            CrudAction::Update { data, .. } => assert_eq!(data, Salary { salary: 500 }),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_create_has_no_target() {
        let action: CrudAction<Salary, ()> = CrudAction::Create(Salary { salary: 1 });
        assert_eq!(action.target(), None);
        assert_eq!(action.verb(), "create");
    }
}
