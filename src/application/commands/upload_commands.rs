//! Upload Commands - 书籍上传

/// 上传书籍命令
///
/// 文件已经由外部托管服务接收，这里只登记记录
#[derive(Debug, Clone)]
pub struct UploadBook {
    pub file_url: String,
    pub file_name: String,
    pub content_type: String,
}
