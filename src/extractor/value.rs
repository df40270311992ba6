//! `serde_json::Value` 上的可选字段投影。
//!
//! 页面里嵌入的 JSON 结构并不稳定，字段缺失是常态而不是错误，
//! 所以这里的所有方法都返回 `Option` 或空值，从不报错。

use serde_json::Value;

/// 对松散 JSON 的只读投影辅助方法。
pub trait ValueExt {
    /// 按路径逐层取值。对象按键名，数组按数字下标。
    fn at(&self, path: &[&str]) -> Option<&Value>;

    /// 路径上的非空字符串（去除首尾空白后判断）。
    fn str_at(&self, path: &[&str]) -> Option<&str>;

    /// 路径上的数字，小数部分截断。负数与非数字返回 `None`。
    fn u64_at(&self, path: &[&str]) -> Option<u64>;

    /// 把自身当作"字符串或字符串数组或带 `url` 的对象"，取第一个非空字符串。
    fn first_str(&self) -> Option<&str>;

    /// 数组返回全部元素，`null` 返回空，其他值视为单元素列表。
    fn items(&self) -> Vec<&Value>;

    /// 把 `{name}` 对象、对象数组或纯字符串拼接成 `"a, b"` 形式。
    fn joined_names(&self) -> String;
}

impl ValueExt for Value {
    fn at(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |current, key| match current {
            Value::Object(map) => map.get(*key),
            Value::Array(list) => key.parse::<usize>().ok().and_then(|i| list.get(i)),
            _ => None,
        })
    }

    fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.at(path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn u64_at(&self, path: &[&str]) -> Option<u64> {
        let value = self.at(path)?;
        if let Some(n) = value.as_u64() {
            return Some(n);
        }
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    }

    fn first_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()),
            Value::Array(list) => list.iter().find_map(ValueExt::first_str),
            Value::Object(_) => self.str_at(&["url"]),
            _ => None,
        }
    }

    fn items(&self) -> Vec<&Value> {
        match self {
            Value::Array(list) => list.iter().collect(),
            Value::Null => Vec::new(),
            other => vec![other],
        }
    }

    fn joined_names(&self) -> String {
        self.items()
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim()),
                _ => item.str_at(&["name"]),
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
