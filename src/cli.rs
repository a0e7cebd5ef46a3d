use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "game-catalog")]
#[command(about = "ゲームケース写真OCR・ゲームライブラリ台帳ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// カタログファイル（省略時は設定値、既定: GameLibrary.xlsx）
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ゲームケースを撮影・OCRしてカタログに登録
    Scan {
        /// 撮影の代わりにフォルダ内の写真を順に使う
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// 撮影コマンド（省略時は設定値）
        #[arg(long)]
        camera: Option<String>,
    },

    /// OCRテキストを分類して結果を表示
    Classify {
        /// テキストファイル（省略時は標準入力）
        input: Option<PathBuf>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 手入力でカタログに追加
    Add {
        /// ゲーム機
        #[arg(required = true)]
        console: String,

        /// タイトル
        #[arg(required = true)]
        title: String,
    },

    /// カタログを一覧表示
    List,

    /// 設定を表示/編集
    Config {
        /// OCR.Space APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 撮影コマンドを設定
        #[arg(long)]
        set_camera: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
