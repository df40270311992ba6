//! fastvideosave 请求头中 URL 字段的加密。
//! 仅用于构造请求，不应用于实际安全目的。

use aes::{
    Aes128,
    cipher::{BlockSizeUser, generic_array::GenericArray},
};
use block_padding::Pkcs7;
use cipher::{BlockEncryptMut, KeyInit};
use ecb::Encryptor as EcbModeEncryptor;

use crate::error::{DlKitError, Result};

/// 后端使用的固定 AES-128 密钥。
pub(crate) const URL_KEY: &[u8] = b"qwertyuioplkjhgf";

///
/// 使用 AES-128-ECB 加密帖子链接，并编码为小写十六进制。
///
/// 填充方式为 PKCS#7：即使明文恰好是 16 字节的整数倍，也会追加一个完整的填充块。
///
/// # 参数
/// * `url` - 明文链接。
///
/// # 返回
/// 密文的小写十六进制字符串，长度总是 32 的整数倍。
///
pub fn encrypt_url(url: &str) -> Result<String> {
    encrypt_with_key(url.as_bytes(), URL_KEY)
}

fn encrypt_with_key(data: &[u8], key: &[u8]) -> Result<String> {
    let block_size = Aes128::block_size();
    if key.len() != block_size {
        return Err(DlKitError::Encryption(format!(
            "AES 密钥长度必须为 {} 字节，但实际为 {}",
            block_size,
            key.len()
        )));
    }

    let cipher = EcbModeEncryptor::<Aes128>::new(GenericArray::from_slice(key));

    let msg_len = data.len();
    let mut buffer = data.to_vec();
    buffer.resize((msg_len / block_size + 1) * block_size, 0);

    let ciphertext = cipher
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, msg_len)
        .map_err(|e| DlKitError::Encryption(format!("AES-ECB 加密失败: {e:?}")))?;

    Ok(hex::encode(ciphertext))
}
