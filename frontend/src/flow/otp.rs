//! 一次性验证码输入模型
//!
//! 六个单字符输入框，每格只接受一位数字。

pub const OTP_LENGTH: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpCells {
    cells: [Option<char>; OTP_LENGTH],
}

impl OtpCells {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单格显示值
    pub fn cell(&self, index: usize) -> String {
        self.cells
            .get(index)
            .copied()
            .flatten()
            .map(String::from)
            .unwrap_or_default()
    }

    /// 处理单格输入，返回应当获得焦点的格子
    ///
    /// 取输入中最后一位数字；空输入清空该格；不含数字的输入不改变该格。
    pub fn input(&mut self, index: usize, raw: &str) -> Option<usize> {
        let slot = self.cells.get_mut(index)?;
        if raw.is_empty() {
            *slot = None;
            return None;
        }
        let digit = raw.chars().rev().find(char::is_ascii_digit)?;
        *slot = Some(digit);
        (index + 1 < OTP_LENGTH).then_some(index + 1)
    }

    /// 在空格上按退格时焦点回到前一格
    pub fn backspace(&self, index: usize) -> Option<usize> {
        let empty = self.cells.get(index).is_some_and(Option::is_none);
        (empty && index > 0).then(|| index - 1)
    }

    /// 粘贴：取前六位数字从第一格开始填充，返回焦点位置
    ///
    /// 不含数字的内容被忽略。
    pub fn paste(&mut self, text: &str) -> Option<usize> {
        let digits: Vec<char> = text
            .chars()
            .filter(char::is_ascii_digit)
            .take(OTP_LENGTH)
            .collect();
        if digits.is_empty() {
            return None;
        }

        self.cells = [None; OTP_LENGTH];
        for (slot, digit) in self.cells.iter_mut().zip(&digits) {
            *slot = Some(*digit);
        }
        Some(digits.len().min(OTP_LENGTH - 1))
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// 六格全部填满时返回完整验证码
    pub fn code(&self) -> Option<String> {
        self.is_complete()
            .then(|| self.cells.iter().flatten().collect())
    }

    pub fn clear(&mut self) {
        self.cells = [None; OTP_LENGTH];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(code: &str) -> OtpCells {
        let mut cells = OtpCells::new();
        for (i, c) in code.chars().enumerate() {
            cells.input(i, &c.to_string());
        }
        cells
    }

    #[test]
    fn test_digit_advances_focus() {
        let mut cells = OtpCells::new();
        assert_eq!(cells.input(0, "4"), Some(1));
        assert_eq!(cells.cell(0), "4");
        // 最后一格不再前进
        assert_eq!(cells.input(5, "9"), None);
    }

    #[test]
    fn test_non_digit_leaves_cell_unchanged() {
        let mut cells = filled("12");
        assert_eq!(cells.input(1, "x"), None);
        assert_eq!(cells.cell(1), "2");
        assert_eq!(cells.input(3, "-"), None);
        assert_eq!(cells.cell(3), "");
    }

    #[test]
    fn test_latest_digit_wins_and_empty_clears() {
        let mut cells = filled("12");
        assert_eq!(cells.input(0, "17"), Some(1));
        assert_eq!(cells.cell(0), "7");
        assert_eq!(cells.input(1, ""), None);
        assert_eq!(cells.cell(1), "");
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let mut cells = OtpCells::new();
        assert_eq!(cells.input(9, "1"), None);
        assert_eq!(cells, OtpCells::new());
    }

    #[test]
    fn test_backspace_moves_back_only_from_empty_cell() {
        let cells = filled("12");
        assert_eq!(cells.backspace(2), Some(1));
        assert_eq!(cells.backspace(1), None);
        assert_eq!(OtpCells::new().backspace(0), None);
    }

    #[test]
    fn test_paste_filters_and_truncates() {
        let mut cells = OtpCells::new();
        assert_eq!(cells.paste("12-34 56 78"), Some(5));
        assert_eq!(cells.code().as_deref(), Some("123456"));

        let mut partial = filled("999999");
        assert_eq!(partial.paste("12"), Some(2));
        assert_eq!(partial.cell(0), "1");
        assert_eq!(partial.cell(2), "");
        assert!(partial.code().is_none());
    }

    #[test]
    fn test_paste_without_digits_is_ignored() {
        let mut cells = filled("123");
        assert_eq!(cells.paste("abc"), None);
        assert_eq!(cells.cell(2), "3");
    }

    #[test]
    fn test_code_requires_all_cells() {
        let mut cells = filled("12345");
        assert!(cells.code().is_none());
        cells.input(5, "6");
        assert_eq!(cells.code().as_deref(), Some("123456"));
        cells.clear();
        assert!(!cells.is_complete());
    }
}
